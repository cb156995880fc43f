//! Opaque byte ranges that round-trip without interpretation.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rw::ReadWriter;

/// Bytes captured verbatim on decode and re-emitted verbatim on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawBytes(pub Vec<u8>);

impl RawBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Whatever is left of the current sized block.
    pub fn rest(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.rest(&mut self.0)
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
