//! Materials container (`0x000100FB`).

use serde::{Deserialize, Serialize};

use crate::common::{Color, ObjectName};
use crate::error::{GfsError, Result};
use crate::rw::{read_write_fields, ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialPayload {
    pub materials: Vec<Material>,
}

impl ReadWrite for MaterialPayload {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.counted_u16(&mut self.materials, "materials")
    }
}

/// Texture map slots, in the order their flag bits and records appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureSlot {
    Diffuse,
    Normal,
    Specular,
    Reflection,
    Highlight,
    Glow,
    Night,
    Detail,
    Shadow,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 9] = [
        TextureSlot::Diffuse,
        TextureSlot::Normal,
        TextureSlot::Specular,
        TextureSlot::Reflection,
        TextureSlot::Highlight,
        TextureSlot::Glow,
        TextureSlot::Night,
        TextureSlot::Detail,
        TextureSlot::Shadow,
    ];

    pub fn flag(self) -> u32 {
        1 << (20 + self as u32)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: ObjectName,
    pub flags: u32,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub reflectivity: f32,
    pub outline_index: f32,
    pub draw_method: u8,
    pub unknown_0x51: [u8; 5],
    pub unknown_0x56: u16,
    pub unknown_0x58: u16,
    pub unknown_0x5a: i16,
    pub unknown_0x5c: i16,
    pub unknown_0x5e: Option<i16>,
    pub unknown_0x6a: i32,
    /// Indexed by [`TextureSlot`].
    pub textures: [Option<TextureRef>; 9],
    pub attributes: Option<Vec<MaterialAttribute>>,
}

impl Material {
    pub const HAS_ATTRIBUTES: u32 = 1 << 16;

    pub fn texture(&self, slot: TextureSlot) -> Option<&TextureRef> {
        self.textures[slot as usize].as_ref()
    }
}

impl ReadWrite for Material {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.field(&mut self.name)?;
        self.flags = rw.u32(self.flags)?;
        rw.field(&mut self.ambient)?;
        rw.field(&mut self.diffuse)?;
        rw.field(&mut self.specular)?;
        rw.field(&mut self.emissive)?;
        self.reflectivity = rw.f32(self.reflectivity)?;
        self.outline_index = rw.f32(self.outline_index)?;
        self.draw_method = rw.u8(self.draw_method)?;
        self.unknown_0x51 = rw.array(self.unknown_0x51)?;
        self.unknown_0x56 = rw.u16(self.unknown_0x56)?;
        self.unknown_0x58 = rw.u16(self.unknown_0x58)?;
        self.unknown_0x5a = rw.i16(self.unknown_0x5a)?;
        self.unknown_0x5c = rw.i16(self.unknown_0x5c)?;
        let gate = rw.version().has_material_unknown_0x5e();
        rw.gated(gate, &mut self.unknown_0x5e, "material unknown_0x5E")?;
        self.unknown_0x6a = rw.i32(self.unknown_0x6a)?;

        for (slot, texture) in TextureSlot::ALL.iter().zip(self.textures.iter_mut()) {
            rw.gated(self.flags & slot.flag() != 0, texture, "texture map")?;
        }
        rw.gated_with(
            self.flags & Self::HAS_ATTRIBUTES != 0,
            &mut self.attributes,
            "material attributes",
            |rw, attributes| rw.counted_u32(attributes, "material attributes"),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub name: ObjectName,
    pub unknown_0x04: u32,
    pub unknown_0x08: u8,
    pub has_texture_filtering: u8,
    pub unknown_0x0a: u8,
    pub unknown_0x0b: u8,
    pub unknown_0x0c: [f32; 16],
}

read_write_fields!(TextureRef {
    name,
    unknown_0x04,
    unknown_0x08,
    has_texture_filtering,
    unknown_0x0a,
    unknown_0x0b,
    unknown_0x0c,
});

/// One shading attribute. The header word packs `ctr_flags` in its high half
/// and the body kind in its low half.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialAttribute {
    pub ctr_flags: u16,
    pub body: AttributeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeBody {
    Toon(Toon),
    Type1(ParamBlock12),
    Outline { outline_type: u32, color: u32 },
    Type3(ParamBlock12),
    Type4(Attribute4),
    Type5(ParamBlock13),
    Type6([u32; 3]),
    Type7,
}

impl Default for AttributeBody {
    fn default() -> Self {
        AttributeBody::Type7
    }
}

impl AttributeBody {
    pub fn kind(&self) -> u16 {
        match self {
            AttributeBody::Toon(_) => 0,
            AttributeBody::Type1(_) => 1,
            AttributeBody::Outline { .. } => 2,
            AttributeBody::Type3(_) => 3,
            AttributeBody::Type4(_) => 4,
            AttributeBody::Type5(_) => 5,
            AttributeBody::Type6(_) => 6,
            AttributeBody::Type7 => 7,
        }
    }

    fn empty(kind: u16) -> Result<Self> {
        Ok(match kind {
            0 => AttributeBody::Toon(Toon::default()),
            1 => AttributeBody::Type1(ParamBlock12::default()),
            2 => AttributeBody::Outline {
                outline_type: 0,
                color: 0,
            },
            3 => AttributeBody::Type3(ParamBlock12::default()),
            4 => AttributeBody::Type4(Attribute4::default()),
            5 => AttributeBody::Type5(ParamBlock13::default()),
            6 => AttributeBody::Type6([0; 3]),
            7 => AttributeBody::Type7,
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "material attribute type",
                    value: value as u32,
                })
            }
        })
    }
}

impl ReadWrite for MaterialAttribute {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let header = ((self.ctr_flags as u32) << 16) | self.body.kind() as u32;
        let header = rw.u32(header)?;
        if rw.is_decoding() {
            self.ctr_flags = (header >> 16) as u16;
            self.body = AttributeBody::empty((header & 0xFFFF) as u16)?;
        }
        match &mut self.body {
            AttributeBody::Toon(toon) => rw.field(toon),
            AttributeBody::Type1(block) | AttributeBody::Type3(block) => rw.field(block),
            AttributeBody::Outline {
                outline_type,
                color,
            } => {
                *outline_type = rw.u32(*outline_type)?;
                *color = rw.u32(*color)?;
                Ok(())
            }
            AttributeBody::Type4(attribute) => rw.field(attribute),
            AttributeBody::Type5(block) => rw.field(block),
            AttributeBody::Type6(values) => rw.field(values),
            AttributeBody::Type7 => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toon {
    pub color: Color,
    pub light_threshold: f32,
    pub light_factor: f32,
    pub light_brightness: f32,
    pub shadow_threshold: f32,
    pub shadow_factor: f32,
    pub flags: Option<u32>,
}

impl ReadWrite for Toon {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.field(&mut self.color)?;
        self.light_threshold = rw.f32(self.light_threshold)?;
        self.light_factor = rw.f32(self.light_factor)?;
        self.light_brightness = rw.f32(self.light_brightness)?;
        self.shadow_threshold = rw.f32(self.shadow_threshold)?;
        self.shadow_factor = rw.f32(self.shadow_factor)?;
        let gate = rw.version().has_toon_flags();
        rw.gated(gate, &mut self.flags, "toon flags")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBlock12 {
    pub values: [f32; 12],
    pub flags: u32,
}

read_write_fields!(ParamBlock12 { values, flags });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBlock13 {
    pub values: [f32; 13],
    pub flags: u32,
}

read_write_fields!(ParamBlock13 { values, flags });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute4 {
    pub values: [f32; 17],
    pub unknown_0x44: u8,
    pub unknown_0x45: f32,
    pub unknown_0x49: u8,
    pub flags: u32,
}

read_write_fields!(Attribute4 {
    values,
    unknown_0x44,
    unknown_0x45,
    unknown_0x49,
    flags,
});
