//! Per-traversal codec state.

use gfs_buffers::Endianness;

use crate::version::GfsVersion;

/// Which way the field contract moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

/// State carried explicitly through one decode or encode traversal.
///
/// `version` is swapped for the duration of a nested container and restored
/// afterwards; see [`crate::ReadWriter::with_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub direction: Direction,
    pub version: GfsVersion,
    pub endianness: Endianness,
}

impl Context {
    pub fn new(direction: Direction, endianness: Endianness) -> Self {
        Self {
            direction,
            version: GfsVersion(0),
            endianness,
        }
    }

    pub fn is_decoding(&self) -> bool {
        self.direction == Direction::Decode
    }
}
