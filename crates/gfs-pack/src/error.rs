//! Error types for GFS decoding and encoding.

use gfs_buffers::BufferError;
use thiserror::Error;

/// Fatal codec failures. Any of these aborts the current container and no
/// partial object graph is returned.
#[derive(Debug, Error)]
pub enum GfsError {
    #[error("malformed stream: {0}")]
    Buffer(#[from] BufferError),
    #[error("{what} at offset {offset:#x}: expected {expected:#x}, found {found:#x}")]
    AssertionFailed {
        what: &'static str,
        expected: u64,
        found: u64,
        offset: usize,
    },
    #[error("unrecognised GFS container type {tag:#010x} at offset {offset:#x}")]
    UnrecognizedContainer { tag: u32, offset: usize },
    #[error("unrecognised attachment type {tag} on node {node}")]
    UnrecognizedAttachment { tag: u32, node: usize },
    #[error("unrecognised {what} {value}")]
    UnrecognizedVariant { what: &'static str, value: u32 },
    #[error("unsupported version {version:#010x}, minimum is {minimum:#010x}")]
    UnsupportedVersion { version: u32, minimum: u32 },
    #[error("{what}: declared {declared} bytes, consumed {actual}")]
    LengthMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },
    #[error("{what} is required at this version or flag set but was not provided")]
    MissingField { what: &'static str },
    #[error("inconsistent {what}")]
    Inconsistent { what: String },
    #[error("too many {what}: {count} exceeds {max}")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },
    #[error("node hierarchy nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("not a GFS file: bad magic {0:02x?}")]
    InvalidMagic([u8; 4]),
    #[error("invalid codec options: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GfsError>;
