//! Auto-growing binary writer with reserve-then-patch slots.

use crate::{BufferError, Endianness};

macro_rules! write_number {
    ($(#[$doc:meta] $name:ident => $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                match self.endianness {
                    Endianness::Big => self.uint8.extend_from_slice(&value.to_be_bytes()),
                    Endianness::Little => self.uint8.extend_from_slice(&value.to_le_bytes()),
                }
            }
        )*
    };
}

/// A `u32` slot reserved in a [`Writer`], filled in by [`Writer::patch_u32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    offset: usize,
}

impl Reservation {
    /// Absolute offset of the slot.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A binary writer backed by a growable `Vec<u8>`.
///
/// # Example
///
/// ```
/// use gfs_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u16(0x0102);
/// writer.buf(b"ab");
/// assert_eq!(writer.flush(), vec![0x01, 0x02, b'a', b'b']);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Writer {
    /// Bytes written so far.
    pub uint8: Vec<u8>,
    /// Byte order for multi-byte writes.
    pub endianness: Endianness,
}

impl Writer {
    /// Creates a big-endian writer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            uint8: Vec::new(),
            endianness,
        }
    }

    /// Current write offset, which is also the number of bytes written.
    pub fn position(&self) -> usize {
        self.uint8.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.uint8
    }

    /// Takes the written bytes, leaving the writer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }

    /// Writes a raw byte slice.
    pub fn buf(&mut self, data: &[u8]) {
        self.uint8.extend_from_slice(data);
    }

    /// Writes a `u32` length prefix followed by the bytes.
    pub fn lp_bytes(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let len = u32::try_from(data.len()).map_err(|_| BufferError::Overflow { len: data.len() })?;
        self.u32(len);
        self.buf(data);
        Ok(())
    }

    /// Writes a zeroed `u32` placeholder and returns its slot.
    pub fn reserve_u32(&mut self) -> Reservation {
        let offset = self.position();
        self.uint8.extend_from_slice(&[0; 4]);
        Reservation { offset }
    }

    /// Overwrites a previously reserved slot in place.
    pub fn patch_u32(&mut self, slot: Reservation, value: u32) -> Result<(), BufferError> {
        let len = self.uint8.len();
        let target = self
            .uint8
            .get_mut(slot.offset..slot.offset + 4)
            .ok_or(BufferError::PatchOutOfRange {
                offset: slot.offset,
                len,
            })?;
        let bytes = match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        target.copy_from_slice(&bytes);
        Ok(())
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.uint8.push(value);
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, value: i8) {
        self.uint8.push(value as u8);
    }

    write_number! {
        /// Writes an unsigned 16-bit integer.
        u16 => u16,
        /// Writes a signed 16-bit integer.
        i16 => i16,
        /// Writes an unsigned 32-bit integer.
        u32 => u32,
        /// Writes a signed 32-bit integer.
        i32 => i32,
        /// Writes an unsigned 64-bit integer.
        u64 => u64,
        /// Writes a signed 64-bit integer.
        i64 => i64,
        /// Writes a 32-bit floating point number.
        f32 => f32,
        /// Writes a 64-bit floating point number.
        f64 => f64,
    }
}
