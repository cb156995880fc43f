//! Byte-level reading and writing for GFS containers.
//!
//! Every primitive honours a per-stream [`Endianness`]. Reads are fallible:
//! running past the readable window returns [`BufferError::EndOfBuffer`]
//! instead of truncating or padding.
//!
//! # Overview
//!
//! - [`Reader`] - Reads binary data from a byte slice with cursor tracking
//! - [`Writer`] - Writes binary data to an auto-growing buffer
//! - [`Reservation`] - A placeholder slot in a [`Writer`] that is patched later
//!
//! # Example
//!
//! ```
//! use gfs_buffers::{Endianness, Reader, Writer};
//!
//! let mut writer = Writer::with_endianness(Endianness::Little);
//! writer.u8(0x01);
//! let slot = writer.reserve_u32();
//! writer.u16(0x0203);
//! let len = writer.position() as u32;
//! writer.patch_u32(slot, len).unwrap();
//! let data = writer.flush();
//!
//! let mut reader = Reader::with_endianness(&data, Endianness::Little);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.u32().unwrap(), 7);
//! assert_eq!(reader.u16().unwrap(), 0x0203);
//! assert!(reader.u8().is_err());
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::{Reservation, Writer};

/// Byte order of multi-byte values in a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the readable window.
    EndOfBuffer {
        offset: usize,
        need: usize,
        have: usize,
    },
    /// A patch or seek targeted bytes outside the buffer.
    PatchOutOfRange { offset: usize, len: usize },
    /// A length does not fit its prefix.
    Overflow { len: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { offset, need, have } => write!(
                f,
                "end of buffer at offset {offset:#x}: need {need} bytes, have {have}"
            ),
            BufferError::PatchOutOfRange { offset, len } => {
                write!(f, "offset {offset:#x} out of range for buffer of {len} bytes")
            }
            BufferError::Overflow { len } => write!(f, "length {len} overflows its prefix"),
        }
    }
}

impl std::error::Error for BufferError {}
