//! Container records and tag dispatch.
//!
//! ```text
//! 0x00  u32  version
//! 0x04  u32  type tag
//! 0x08  u32  size      bytes from the start of the record
//! 0x0C  u32  padding   must be zero; absent for the terminal tag
//! 0x10  ...  payload
//! ```

use serde::{Deserialize, Serialize};

use crate::animations::AnimationPayload;
use crate::blob::RawBytes;
use crate::error::{GfsError, Result};
use crate::errorlog::ErrorLog;
use crate::materials::MaterialPayload;
use crate::model::ModelPayload;
use crate::physics::PhysicsPayload;
use crate::rw::{ReadWrite, ReadWriter, SizeOrigin};
use crate::textures::TexturePayload;
use crate::version::GfsVersion;

/// Bytes of `version`, tag, size and padding ahead of a payload.
pub const HEADER_SIZE: u32 = 0x10;

/// The typed body of a container. The tag written on encode always comes
/// from the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Padding only; closes a file.
    Empty,
    /// No padding and no body; follows the file magic.
    Terminal,
    Model(Box<ModelPayload>),
    /// A container that is known to exist but not modelled.
    Blob(RawBytes),
    Physics(PhysicsPayload),
    Materials(MaterialPayload),
    Textures(TexturePayload),
    Animations(AnimationPayload),
}

type Constructor = fn() -> Payload;

const PAYLOADS: &[(u32, Constructor)] = &[
    (Payload::EMPTY, || Payload::Empty),
    (Payload::TERMINAL, || Payload::Terminal),
    (Payload::MODEL, || Payload::Model(Box::default())),
    (Payload::BLOB, || Payload::Blob(RawBytes::default())),
    (Payload::PHYSICS, || Payload::Physics(PhysicsPayload::default())),
    (Payload::MATERIALS, || Payload::Materials(MaterialPayload::default())),
    (Payload::TEXTURES, || Payload::Textures(TexturePayload::default())),
    (Payload::ANIMATIONS, || Payload::Animations(AnimationPayload::default())),
];

impl Payload {
    pub const EMPTY: u32 = 0x0000_0000;
    pub const TERMINAL: u32 = 0x0000_0001;
    pub const MODEL: u32 = 0x0001_0003;
    pub const BLOB: u32 = 0x0001_00F8;
    pub const PHYSICS: u32 = 0x0001_00F9;
    pub const MATERIALS: u32 = 0x0001_00FB;
    pub const TEXTURES: u32 = 0x0001_00FC;
    pub const ANIMATIONS: u32 = 0x0001_00FD;

    pub fn tag(&self) -> u32 {
        match self {
            Payload::Empty => Self::EMPTY,
            Payload::Terminal => Self::TERMINAL,
            Payload::Model(_) => Self::MODEL,
            Payload::Blob(_) => Self::BLOB,
            Payload::Physics(_) => Self::PHYSICS,
            Payload::Materials(_) => Self::MATERIALS,
            Payload::Textures(_) => Self::TEXTURES,
            Payload::Animations(_) => Self::ANIMATIONS,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Terminal => "terminal",
            Payload::Model(_) => "model",
            Payload::Blob(_) => "blob",
            Payload::Physics(_) => "physics",
            Payload::Materials(_) => "materials",
            Payload::Textures(_) => "textures",
            Payload::Animations(_) => "animations",
        }
    }

    /// Resolves a tag through the dispatch table.
    pub fn for_tag(tag: u32) -> Option<Payload> {
        PAYLOADS
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, construct)| construct())
    }

    /// Checks cross-references inside the payload.
    pub fn validate(&self, log: &mut ErrorLog) {
        match self {
            Payload::Model(model) => model.validate(log),
            Payload::Physics(physics) => physics.validate(log),
            _ => {}
        }
    }

    fn read_write_body(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        match self {
            Payload::Empty | Payload::Terminal => Ok(()),
            Payload::Model(model) => rw.field(model),
            Payload::Blob(bytes) => bytes.rest(rw),
            Payload::Physics(physics) => rw.field(physics),
            Payload::Materials(materials) => rw.field(materials),
            Payload::Textures(textures) => rw.field(textures),
            Payload::Animations(animations) => rw.field(animations),
        }
    }
}

/// One versioned, tagged, length-prefixed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub version: u32,
    /// Set from the stream on decode and recomputed on encode. Stored as-is
    /// for the two body-less tags.
    pub size: u32,
    pub payload: Payload,
    /// Bytes inside `size` that the payload schema did not consume.
    pub trailing: Option<RawBytes>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new(0, Payload::Empty)
    }
}

impl Container {
    pub fn new(version: u32, payload: Payload) -> Self {
        Self {
            version,
            size: 0,
            payload,
            trailing: None,
        }
    }

    pub fn version(&self) -> GfsVersion {
        GfsVersion(self.version)
    }

    fn check_version(&self, rw: &ReadWriter<'_>) -> Result<()> {
        let minimum = rw.minimum_version();
        if !self.version().is_supported(minimum) {
            return Err(GfsError::UnsupportedVersion {
                version: self.version,
                minimum: minimum.0,
            });
        }
        Ok(())
    }
}

impl ReadWrite for Container {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let start = rw.position();
        if !rw.is_decoding() {
            self.check_version(rw)?;
        }
        self.version = rw.u32(self.version)?;
        if rw.is_decoding() {
            self.check_version(rw)?;
        }

        let tag = rw.u32(self.payload.tag())?;
        if rw.is_decoding() {
            self.payload = Payload::for_tag(tag)
                .ok_or(GfsError::UnrecognizedContainer { tag, offset: start })?;
            self.trailing = None;
        }
        tracing::debug!(
            offset = start,
            version = %self.version(),
            "{} container {tag:#010x}",
            self.payload.kind()
        );

        match self.payload {
            Payload::Terminal => {
                self.size = rw.u32(self.size)?;
                Ok(())
            }
            Payload::Empty => {
                self.size = rw.u32(self.size)?;
                rw.assert_u32(0, "container padding")
            }
            _ => {
                let version = self.version();
                let payload = &mut self.payload;
                rw.sized(
                    &mut self.size,
                    SizeOrigin::At(start),
                    "container",
                    &mut self.trailing,
                    |rw| {
                        rw.assert_u32(0, "container padding")?;
                        rw.with_version(version, |rw| payload.read_write_body(rw))
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;

    #[test]
    fn every_tag_in_the_table_roundtrips_through_its_variant() {
        for (tag, construct) in PAYLOADS {
            assert_eq!(construct().tag(), *tag);
            assert_eq!(Payload::for_tag(*tag).map(|p| p.tag()), Some(*tag));
        }
        assert!(Payload::for_tag(0x0001_00FA).is_none());
    }

    #[test]
    fn terminal_tag_has_no_padding() {
        let mut container = Container::new(0x0110_4030, Payload::Terminal);
        container.size = 0x10;
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        rw.field(&mut container).unwrap();
        let bytes = rw.finish().0;
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0x10]);
    }

    #[test]
    fn version_is_checked_before_writing() {
        let mut container = Container::new(0x0110_4000, Payload::Blob(RawBytes::default()));
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        assert!(matches!(
            rw.field(&mut container),
            Err(GfsError::UnsupportedVersion { version: 0x0110_4000, .. })
        ));
        assert_eq!(rw.position(), 0);
    }
}
