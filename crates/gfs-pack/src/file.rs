//! Whole `GFS0` files: a magic followed by containers.

use serde::{Deserialize, Serialize};

use crate::animations::AnimationPayload;
use crate::blob::RawBytes;
use crate::container::{Container, Payload};
use crate::error::{GfsError, Result};
use crate::materials::MaterialPayload;
use crate::model::ModelPayload;
use crate::options::LengthPolicy;
use crate::physics::PhysicsPayload;
use crate::rw::{ReadWrite, ReadWriter};
use crate::textures::TexturePayload;

pub const MAGIC: [u8; 4] = *b"GFS0";

/// Containers up to and including the first [`Payload::Empty`], or to the
/// end of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GfsFile {
    pub containers: Vec<Container>,
    /// Bytes after the closing container, kept under the lenient policy.
    pub trailing: Option<RawBytes>,
}

impl GfsFile {
    pub fn new(containers: Vec<Container>) -> Self {
        Self {
            containers,
            trailing: None,
        }
    }

    pub fn payloads(&self) -> impl Iterator<Item = &Payload> {
        self.containers.iter().map(|c| &c.payload)
    }

    pub fn model(&self) -> Option<&ModelPayload> {
        self.payloads().find_map(|p| match p {
            Payload::Model(model) => Some(model.as_ref()),
            _ => None,
        })
    }

    pub fn materials(&self) -> Option<&MaterialPayload> {
        self.payloads().find_map(|p| match p {
            Payload::Materials(materials) => Some(materials),
            _ => None,
        })
    }

    pub fn textures(&self) -> Option<&TexturePayload> {
        self.payloads().find_map(|p| match p {
            Payload::Textures(textures) => Some(textures),
            _ => None,
        })
    }

    pub fn animations(&self) -> Option<&AnimationPayload> {
        self.payloads().find_map(|p| match p {
            Payload::Animations(animations) => Some(animations),
            _ => None,
        })
    }

    pub fn physics(&self) -> Option<&PhysicsPayload> {
        self.payloads().find_map(|p| match p {
            Payload::Physics(physics) => Some(physics),
            _ => None,
        })
    }

    fn read_containers(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.containers.clear();
        while rw.remaining() > 0 {
            let mut container = Container::default();
            rw.field(&mut container)?;
            let closing = matches!(container.payload, Payload::Empty);
            self.containers.push(container);
            if closing {
                break;
            }
        }

        let unread = rw.remaining();
        self.trailing = None;
        if unread == 0 {
            return Ok(());
        }
        if rw.length_policy() == LengthPolicy::Strict {
            return Err(GfsError::LengthMismatch {
                what: "file",
                declared: rw.position(),
                actual: rw.position() + unread,
            });
        }
        rw.log()
            .log_warning(format!("{unread} bytes after the closing container"));
        let mut bytes = RawBytes::default();
        bytes.rest(rw)?;
        self.trailing = Some(bytes);
        Ok(())
    }
}

impl ReadWrite for GfsFile {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let magic = rw.array(MAGIC)?;
        if magic != MAGIC {
            return Err(GfsError::InvalidMagic(magic));
        }
        if rw.is_decoding() {
            return self.read_containers(rw);
        }
        for container in &mut self.containers {
            rw.field(container)?;
        }
        if let Some(bytes) = &mut self.trailing {
            bytes.rest(rw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;

    const VERSION: u32 = 0x0110_4030;

    fn sample() -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        // terminal header: version, tag 1, size
        bytes.extend_from_slice(&VERSION.to_be_bytes());
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        // empty physics
        bytes.extend_from_slice(&VERSION.to_be_bytes());
        bytes.extend_from_slice(&Payload::PHYSICS.to_be_bytes());
        bytes.extend_from_slice(&0x14u32.to_be_bytes());
        bytes.extend_from_slice(&[0; 8]);
        // closing empty container
        bytes.extend_from_slice(&VERSION.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&0x10u32.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes
    }

    fn decode(bytes: &[u8], options: &CodecOptions) -> Result<GfsFile> {
        let mut file = GfsFile::default();
        let mut rw = ReadWriter::decoder(bytes, options);
        rw.field(&mut file)?;
        Ok(file)
    }

    #[test]
    fn reads_until_the_empty_container() {
        let file = decode(&sample(), &CodecOptions::default()).unwrap();
        assert_eq!(file.containers.len(), 3);
        assert!(matches!(file.containers[0].payload, Payload::Terminal));
        assert!(file.physics().unwrap().is_empty());
        assert!(file.model().is_none());
        assert!(file.trailing.is_none());
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = sample();
        bytes[3] = b'1';
        assert!(matches!(
            decode(&bytes, &CodecOptions::default()),
            Err(GfsError::InvalidMagic(m)) if &m == b"GFS1"
        ));
    }

    #[test]
    fn bytes_after_the_closing_container() {
        let mut bytes = sample();
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let file = decode(&bytes, &CodecOptions::default()).unwrap();
        assert_eq!(file.trailing, Some(RawBytes::new(vec![0xAA, 0xBB])));

        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        rw.field(&mut file.clone()).unwrap();
        assert_eq!(rw.finish().0, bytes);

        assert!(matches!(
            decode(&bytes, &CodecOptions::default().strict()),
            Err(GfsError::LengthMismatch { what: "file", .. })
        ));
    }
}
