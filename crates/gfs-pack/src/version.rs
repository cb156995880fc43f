//! Container version thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Oldest container version the schema table supports.
pub const MIN_SUPPORTED: u32 = 0x0110_4030;

/// A GFS container version, e.g. `0x01105100`.
///
/// Each predicate names one field whose presence depends on the version.
/// The same value must be used to decode and re-encode a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GfsVersion(pub u32);

impl GfsVersion {
    /// Whether a container of this version may be decoded or encoded when
    /// `minimum` is the oldest accepted version.
    pub fn is_supported(self, minimum: GfsVersion) -> bool {
        self >= minimum
    }

    /// Object names carry a trailing `u32` hash.
    pub fn has_name_hash(self) -> bool {
        self.0 > 0x0108_0010
    }

    pub fn has_node_properties(self) -> bool {
        self.0 > 0x0106_0000
    }

    pub fn has_node_unknown_float(self) -> bool {
        self.0 > 0x0110_4700
    }

    pub fn has_mesh_unknown_0x14(self) -> bool {
        self.0 > 0x0110_3020
    }

    pub fn has_camera_unknown_0x190(self) -> bool {
        self.0 > 0x0110_4060
    }

    pub fn has_toon_flags(self) -> bool {
        self.0 > 0x0110_4500
    }

    pub fn has_material_unknown_0x5e(self) -> bool {
        self.0 > 0x0110_4800
    }

    pub fn has_animation_flags(self) -> bool {
        self.0 > 0x0110_4110
    }

    pub fn has_animation_pack_flags(self) -> bool {
        self.0 >= 0x0110_4950
    }
}

impl From<u32> for GfsVersion {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for GfsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive_except_pack_flags() {
        assert!(!GfsVersion(0x0110_4110).has_animation_flags());
        assert!(GfsVersion(0x0110_4111).has_animation_flags());
        assert!(!GfsVersion(0x0110_494F).has_animation_pack_flags());
        assert!(GfsVersion(0x0110_4950).has_animation_pack_flags());
        let minimum = GfsVersion(MIN_SUPPORTED);
        assert!(GfsVersion(MIN_SUPPORTED).is_supported(minimum));
        assert!(!GfsVersion(MIN_SUPPORTED - 1).is_supported(minimum));
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(GfsVersion(0x0110_5100).to_string(), "0x01105100");
    }
}
