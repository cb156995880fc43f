//! Particle-effect attachments.
//!
//! Effect instances are kept as opaque bodies. Effect leaves have a typed
//! body for helpers; every other leaf kind stays opaque.

use serde::{Deserialize, Serialize};

use crate::blob::RawBytes;
use crate::common::ObjectName;
use crate::error::Result;
use crate::rw::{ReadWrite, ReadWriter, SizeOrigin};

/// An effect instance; `size` counts the bytes after the size field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Epl {
    pub flags: u32,
    pub size: u32,
    pub body: RawBytes,
}

impl ReadWrite for Epl {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        rw.sized(&mut self.size, SizeOrigin::AfterField, "effect", &mut None, |rw| {
            self.body.rest(rw)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EplLeaf {
    pub flags: u32,
    pub name: ObjectName,
    pub size: u32,
    pub body: EplLeafBody,
    /// Bytes inside `size` that the typed body did not consume.
    pub tail: Option<RawBytes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EplLeafBody {
    Helper(EplHelper),
    Opaque { kind: u32, bytes: RawBytes },
}

impl Default for EplLeafBody {
    fn default() -> Self {
        EplLeafBody::Helper(EplHelper::default())
    }
}

impl EplLeafBody {
    pub const HELPER: u32 = 1;

    pub fn kind(&self) -> u32 {
        match self {
            EplLeafBody::Helper(_) => Self::HELPER,
            EplLeafBody::Opaque { kind, .. } => *kind,
        }
    }
}

impl ReadWrite for EplLeaf {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        rw.field(&mut self.name)?;
        let kind = rw.u32(self.body.kind())?;
        if rw.is_decoding() {
            self.body = match kind {
                EplLeafBody::HELPER => EplLeafBody::Helper(EplHelper::default()),
                kind => EplLeafBody::Opaque {
                    kind,
                    bytes: RawBytes::default(),
                },
            };
        }
        rw.sized(
            &mut self.size,
            SizeOrigin::AfterField,
            "effect leaf",
            &mut self.tail,
            |rw| match &mut self.body {
                EplLeafBody::Helper(helper) => rw.field(helper),
                EplLeafBody::Opaque { bytes, .. } => bytes.rest(rw),
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EplHelper {
    pub helper_type: u32,
    pub unknown_0x04: u32,
    pub unknown_0x08: f32,
    pub unknown_0x0c: f32,
    pub unknown_0x10: f32,
    pub embedded_file_1: Option<EmbeddedFile>,
    pub embedded_file_2: Option<EmbeddedFile>,
    /// `has_embedded_file` bytes that were neither 0 nor 1.
    #[serde(default, skip_serializing_if = "is_canonical")]
    pub embedded_file_markers: [Option<u8>; 2],
}

fn is_canonical(markers: &[Option<u8>; 2]) -> bool {
    markers.iter().all(Option::is_none)
}

impl ReadWrite for EplHelper {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.helper_type = rw.u32(self.helper_type)?;
        self.unknown_0x04 = rw.u32(self.unknown_0x04)?;
        self.unknown_0x08 = rw.f32(self.unknown_0x08)?;
        self.unknown_0x0c = rw.f32(self.unknown_0x0c)?;
        self.unknown_0x10 = rw.f32(self.unknown_0x10)?;
        let files = [&mut self.embedded_file_1, &mut self.embedded_file_2];
        for (file, marker) in files.into_iter().zip(&mut self.embedded_file_markers) {
            let present = rw.presence(file.is_some(), marker)?;
            rw.gated(present, file, "embedded file")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedFile {
    pub name: ObjectName,
    pub data: Vec<u8>,
}

impl ReadWrite for EmbeddedFile {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.field(&mut self.name)?;
        rw.lp_bytes(&mut self.data)
    }
}
