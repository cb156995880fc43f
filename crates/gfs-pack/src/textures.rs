//! Textures container (`0x000100FC`).

use serde::{Deserialize, Serialize};

use crate::common::ObjectName;
use crate::error::Result;
use crate::rw::{ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TexturePayload {
    pub textures: Vec<Texture>,
}

impl ReadWrite for TexturePayload {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.counted_u16(&mut self.textures, "textures")
    }
}

/// An embedded image file, kept as the raw file bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub name: ObjectName,
    pub format: u16,
    pub data: Vec<u8>,
    pub unknown_0x1c: [u8; 4],
}

impl ReadWrite for Texture {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.field(&mut self.name)?;
        self.format = rw.u16(self.format)?;
        rw.lp_bytes(&mut self.data)?;
        self.unknown_0x1c = rw.array(self.unknown_0x1c)?;
        Ok(())
    }
}
