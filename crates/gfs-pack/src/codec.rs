//! Public entry points.

use crate::container::Container;
use crate::error::{GfsError, Result};
use crate::errorlog::ErrorLog;
use crate::file::GfsFile;
use crate::options::{CodecOptions, LengthPolicy};
use crate::rw::{ReadWrite, ReadWriter};
use crate::version::GfsVersion;

/// Decoder and encoder for GFS containers and files.
///
/// Fatal problems come back as [`GfsError`] and leave no partial result.
/// Non-fatal diagnostics from every call accumulate in [`GfsCodec::log`].
///
/// ```
/// use gfs_pack::{Container, GfsCodec, Payload};
///
/// let bytes = [
///     0x01, 0x10, 0x40, 0x30, // version
///     0x00, 0x01, 0x00, 0xF9, // physics
///     0x00, 0x00, 0x00, 0x14, // size
///     0x00, 0x00, 0x00, 0x00, // padding
///     0x00, 0x00, 0x00, 0x00, // bone, collider and link counts
/// ];
/// let mut codec = GfsCodec::default();
/// let mut container = codec.decode_container(&bytes).unwrap();
/// assert!(matches!(container.payload, Payload::Physics(_)));
/// assert_eq!(codec.encode_container(&mut container).unwrap(), bytes);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GfsCodec {
    pub options: CodecOptions,
    pub log: ErrorLog,
}

impl GfsCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            options,
            log: ErrorLog::new(),
        }
    }

    /// Decodes a buffer holding exactly one container record.
    pub fn decode_container(&mut self, bytes: &[u8]) -> Result<Container> {
        let mut container = Container::default();
        let mut rw = ReadWriter::decoder(bytes, &self.options);
        rw.field(&mut container)?;
        let leftover = rw.remaining();
        if leftover > 0 {
            if self.options.length_policy == LengthPolicy::Strict {
                return Err(GfsError::LengthMismatch {
                    what: "buffer",
                    declared: rw.position(),
                    actual: bytes.len(),
                });
            }
            tracing::debug!(leftover, "ignoring bytes after the container record");
        }
        let (_, mut log) = rw.finish();
        container.payload.validate(&mut log);
        self.log.merge(log);
        Ok(container)
    }

    /// Encodes one container, recomputing and storing its `size`.
    pub fn encode_container(&mut self, container: &mut Container) -> Result<Vec<u8>> {
        container.payload.validate(&mut self.log);
        let mut rw = ReadWriter::encoder(&self.options);
        rw.field(container)?;
        let (bytes, log) = rw.finish();
        self.log.merge(log);
        Ok(bytes)
    }

    pub fn decode_file(&mut self, bytes: &[u8]) -> Result<GfsFile> {
        let mut file = GfsFile::default();
        let mut rw = ReadWriter::decoder(bytes, &self.options);
        rw.field(&mut file)?;
        let (_, mut log) = rw.finish();
        for container in &file.containers {
            container.payload.validate(&mut log);
        }
        self.log.merge(log);
        Ok(file)
    }

    pub fn encode_file(&mut self, file: &mut GfsFile) -> Result<Vec<u8>> {
        for container in &file.containers {
            container.payload.validate(&mut self.log);
        }
        let mut rw = ReadWriter::encoder(&self.options);
        rw.field(file)?;
        let (bytes, log) = rw.finish();
        self.log.merge(log);
        Ok(bytes)
    }

    /// Decodes a bare schema value, outside any container, as if it were
    /// stored at `version`.
    pub fn decode_object<T: ReadWrite + Default>(
        &mut self,
        bytes: &[u8],
        version: u32,
    ) -> Result<T> {
        let mut value = T::default();
        let mut rw = ReadWriter::decoder(bytes, &self.options);
        rw.with_version(GfsVersion(version), |rw| rw.field(&mut value))?;
        let (_, log) = rw.finish();
        self.log.merge(log);
        Ok(value)
    }

    pub fn encode_object<T: ReadWrite>(&mut self, value: &mut T, version: u32) -> Result<Vec<u8>> {
        let mut rw = ReadWriter::encoder(&self.options);
        rw.with_version(GfsVersion(version), |rw| rw.field(value))?;
        let (bytes, log) = rw.finish();
        self.log.merge(log);
        Ok(bytes)
    }
}

/// One-shot [`GfsCodec::decode_container`].
pub fn decode_container(bytes: &[u8], options: &CodecOptions) -> Result<(Container, ErrorLog)> {
    let mut codec = GfsCodec::new(*options);
    let container = codec.decode_container(bytes)?;
    Ok((container, codec.log))
}

/// One-shot [`GfsCodec::encode_container`].
pub fn encode_container(
    container: &mut Container,
    options: &CodecOptions,
) -> Result<(Vec<u8>, ErrorLog)> {
    let mut codec = GfsCodec::new(*options);
    let bytes = codec.encode_container(container)?;
    Ok((bytes, codec.log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectName;

    #[test]
    fn leftover_bytes_fail_only_when_strict() {
        let mut bytes = vec![
            0x01, 0x10, 0x40, 0x30, 0x00, 0x01, 0x00, 0xF9, 0x00, 0x00, 0x00, 0x14, 0, 0, 0, 0, 0,
            0, 0, 0,
        ];
        bytes.push(0xEE);

        assert!(GfsCodec::default().decode_container(&bytes).is_ok());
        assert!(matches!(
            GfsCodec::new(CodecOptions::default().strict()).decode_container(&bytes),
            Err(GfsError::LengthMismatch { what: "buffer", .. })
        ));
    }

    #[test]
    fn objects_follow_the_explicit_version() {
        let mut codec = GfsCodec::default();
        let mut name = ObjectName::new("root", 0xDEAD_BEEF);

        let hashed = codec.encode_object(&mut name, 0x0110_4030).unwrap();
        assert_eq!(hashed.len(), 2 + 4 + 4);
        let unhashed = codec.encode_object(&mut name, 0x0108_0010).unwrap();
        assert_eq!(unhashed, [0, 4, b'r', b'o', b'o', b't']);

        let decoded: ObjectName = codec.decode_object(&unhashed, 0x0108_0010).unwrap();
        assert_eq!(decoded, ObjectName::unhashed("root"));
    }
}
