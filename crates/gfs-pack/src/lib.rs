//! Symmetric decoder/encoder for GFS containers.
//!
//! Every schema implements [`ReadWrite`] once and runs in both directions
//! through a [`ReadWriter`]. Containers are dispatched by type tag,
//! version-gated fields are controlled by [`GfsVersion`], and sized blocks
//! are backpatched on encode and bounded on decode.
//!
//! Fatal problems surface as [`GfsError`]; broken cross-references and
//! length mismatches tolerated under [`LengthPolicy::Lenient`] accumulate in
//! an [`ErrorLog`].

mod codec;
mod error;
mod errorlog;
mod options;

pub mod animations;
pub mod blob;
pub mod common;
pub mod container;
pub mod context;
pub mod file;
pub mod materials;
pub mod model;
pub mod physics;
pub mod rw;
pub mod textures;
pub mod version;

pub use blob::RawBytes;
pub use codec::{decode_container, encode_container, GfsCodec};
pub use container::{Container, Payload};
pub use context::{Context, Direction};
pub use error::{GfsError, Result};
pub use errorlog::{Diagnostic, ErrorLog, Severity};
pub use file::{GfsFile, MAGIC};
pub use options::{CodecOptions, LengthPolicy};
pub use rw::{ReadWrite, ReadWriter, SizeOrigin};
pub use version::{GfsVersion, MIN_SUPPORTED};

pub use gfs_buffers::Endianness;
