//! Codec configuration.

use gfs_buffers::Endianness;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::version::MIN_SUPPORTED;

/// What to do when a sized block declares more bytes than its schema reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Log a warning and keep the unread bytes as an opaque tail.
    #[default]
    Lenient,
    /// Fail with [`crate::GfsError::LengthMismatch`].
    Strict,
}

/// Options for one decode or encode.
///
/// ```
/// use gfs_pack::{CodecOptions, LengthPolicy};
/// use gfs_buffers::Endianness;
///
/// let options = CodecOptions::from_toml_str(
///     "endianness = \"little\"\nlength_policy = \"strict\"\n",
/// )
/// .unwrap();
/// assert_eq!(options.endianness, Endianness::Little);
/// assert_eq!(options.length_policy, LengthPolicy::Strict);
/// assert_eq!(options.minimum_version, 0x01104030);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    pub endianness: Endianness,
    pub length_policy: LengthPolicy,
    pub minimum_version: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            endianness: Endianness::Big,
            length_policy: LengthPolicy::Lenient,
            minimum_version: MIN_SUPPORTED,
        }
    }
}

impl CodecOptions {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn little_endian() -> Self {
        Self {
            endianness: Endianness::Little,
            ..Self::default()
        }
    }

    pub fn strict(self) -> Self {
        Self {
            length_policy: LengthPolicy::Strict,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CodecOptions::from_toml_str("").unwrap(), CodecOptions::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CodecOptions::from_toml_str("endian = \"big\"").is_err());
    }

    #[test]
    fn minimum_version_override() {
        let options = CodecOptions::from_toml_str("minimum_version = 0x01000000").unwrap();
        assert_eq!(options.minimum_version, 0x0100_0000);
        assert_eq!(options.endianness, Endianness::Big);
    }
}
