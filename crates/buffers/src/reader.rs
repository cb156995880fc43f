//! Binary buffer reader with cursor tracking.

use crate::{BufferError, Endianness};

macro_rules! read_number {
    ($(#[$doc:meta] $name:ident => $ty:ty, $n:literal);* $(;)?) => {
        $(
            #[$doc]
            #[inline]
            pub fn $name(&mut self) -> Result<$ty, BufferError> {
                let bytes = self.array::<$n>()?;
                Ok(match self.endianness {
                    Endianness::Big => <$ty>::from_be_bytes(bytes),
                    Endianness::Little => <$ty>::from_le_bytes(bytes),
                })
            }
        )*
    };
}

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader keeps a cursor `x` and an exclusive `end` bound. The bound can
/// be narrowed with [`Reader::limit`] so that a sized block cannot read into
/// whatever follows it.
///
/// # Example
///
/// ```
/// use gfs_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert_eq!(reader.size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
    /// Byte order for multi-byte reads.
    pub endianness: Endianness,
}

impl<'a> Reader<'a> {
    /// Creates a big-endian reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self::with_endianness(uint8, Endianness::Big)
    }

    pub fn with_endianness(uint8: &'a [u8], endianness: Endianness) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
            endianness,
        }
    }

    /// Creates a reader over `uint8[x..end]`, keeping absolute offsets.
    pub fn from_slice(
        uint8: &'a [u8],
        x: usize,
        end: usize,
        endianness: Endianness,
    ) -> Result<Self, BufferError> {
        if x > end || end > uint8.len() {
            return Err(BufferError::PatchOutOfRange {
                offset: end.max(x),
                len: uint8.len(),
            });
        }
        Ok(Self {
            uint8,
            x,
            end,
            endianness,
        })
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.x)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn position(&self) -> usize {
        self.x
    }

    /// Moves the cursor to an absolute offset inside the readable window.
    pub fn seek(&mut self, x: usize) -> Result<(), BufferError> {
        if x > self.end {
            return Err(BufferError::PatchOutOfRange {
                offset: x,
                len: self.end,
            });
        }
        self.x = x;
        Ok(())
    }

    /// Narrows the readable window to end at `end` and returns the previous
    /// bound, to be handed back to [`Reader::restore_end`].
    pub fn limit(&mut self, end: usize) -> Result<usize, BufferError> {
        if end < self.x || end > self.end {
            return Err(BufferError::EndOfBuffer {
                offset: self.x,
                need: end.saturating_sub(self.x),
                have: self.size(),
            });
        }
        Ok(std::mem::replace(&mut self.end, end))
    }

    pub fn restore_end(&mut self, end: usize) {
        self.end = end.min(self.uint8.len());
    }

    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.size() {
            return Err(BufferError::EndOfBuffer {
                offset: self.x,
                need: n,
                have: self.size(),
            });
        }
        Ok(())
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.check(length)?;
        self.x += length;
        Ok(())
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        self.x += size;
        Ok(&self.uint8[x..self.x])
    }

    /// Returns everything up to the end of the window and advances past it.
    pub fn rest(&mut self) -> &'a [u8] {
        let x = self.x.min(self.end);
        self.x = self.end;
        &self.uint8[x..self.end]
    }

    /// Creates a bounded reader over the next `size` bytes and advances the
    /// cursor past them.
    pub fn cut(&mut self, size: usize) -> Result<Reader<'a>, BufferError> {
        self.check(size)?;
        let slice = Reader::from_slice(self.uint8, self.x, self.x + size, self.endianness)?;
        self.x += size;
        Ok(slice)
    }

    /// Reads a fixed-length byte array.
    #[inline]
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Reads a `u32` length prefix followed by that many bytes.
    pub fn lp_bytes(&mut self) -> Result<&'a [u8], BufferError> {
        let len = self.u32()? as usize;
        self.buf(len)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        Ok(self.u8()? as i8)
    }

    read_number! {
        /// Reads an unsigned 16-bit integer.
        u16 => u16, 2;
        /// Reads a signed 16-bit integer.
        i16 => i16, 2;
        /// Reads an unsigned 32-bit integer.
        u32 => u32, 4;
        /// Reads a signed 32-bit integer.
        i32 => i32, 4;
        /// Reads an unsigned 64-bit integer.
        u64 => u64, 8;
        /// Reads a signed 64-bit integer.
        i64 => i64, 8;
        /// Reads a 32-bit floating point number.
        f32 => f32, 4;
        /// Reads a 64-bit floating point number.
        f64 => f64, 8;
    }
}
