//! Structures shared by several payload schemas.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{GfsError, Result};
use crate::rw::{read_write_fields, ReadWrite, ReadWriter};

pub type Vec3 = [f32; 3];
pub type Quat = [f32; 4];
pub type Color = [f32; 4];
pub type Matrix4x3 = [f32; 12];

/// A length-prefixed name with an optional version-gated hash.
///
/// The hash is stored exactly as found; producers building names from
/// scratch must supply it when encoding at a hash-bearing version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectName {
    pub bytes: Vec<u8>,
    pub hash: Option<u32>,
}

impl ObjectName {
    pub fn new(name: &str, hash: u32) -> Self {
        Self {
            bytes: name.as_bytes().to_vec(),
            hash: Some(hash),
        }
    }

    /// A name for versions that predate name hashes.
    pub fn unhashed(name: &str) -> Self {
        Self {
            bytes: name.as_bytes().to_vec(),
            hash: None,
        }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl ReadWrite for ObjectName {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let len = rw.len_u16(self.bytes.len(), "name length")?;
        rw.bytes(&mut self.bytes, len, "name")?;
        let hashed = rw.version().has_name_hash();
        rw.gated(hashed, &mut self.hash, "name hash")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub max: Vec3,
    pub min: Vec3,
}

read_write_fields!(BoundingBox { max, min });

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

read_write_fields!(BoundingSphere { center, radius });

/// A user property attached to a node or animation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: ObjectName,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(i32),
    Float(f32),
    Bool(u8),
    /// Stored with a trailing NUL that is not part of the value.
    String(Vec<u8>),
    ByteVector3([u8; 3]),
    ByteVector4([u8; 4]),
    Vector3(Vec3),
    Vector4([f32; 4]),
    ByteArray(Vec<u8>),
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Int(0)
    }
}

impl PropertyValue {
    pub fn kind(&self) -> u32 {
        match self {
            PropertyValue::Int(_) => 1,
            PropertyValue::Float(_) => 2,
            PropertyValue::Bool(_) => 3,
            PropertyValue::String(_) => 4,
            PropertyValue::ByteVector3(_) => 5,
            PropertyValue::ByteVector4(_) => 6,
            PropertyValue::Vector3(_) => 7,
            PropertyValue::Vector4(_) => 8,
            PropertyValue::ByteArray(_) => 9,
        }
    }

    fn empty(kind: u32) -> Result<Self> {
        Ok(match kind {
            1 => PropertyValue::Int(0),
            2 => PropertyValue::Float(0.0),
            3 => PropertyValue::Bool(0),
            4 => PropertyValue::String(Vec::new()),
            5 => PropertyValue::ByteVector3([0; 3]),
            6 => PropertyValue::ByteVector4([0; 4]),
            7 => PropertyValue::Vector3([0.0; 3]),
            8 => PropertyValue::Vector4([0.0; 4]),
            9 => PropertyValue::ByteArray(Vec::new()),
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "property type",
                    value,
                })
            }
        })
    }

    /// Encoded byte size of the value, as stored in the size field.
    fn size(&self) -> usize {
        match self {
            PropertyValue::Int(_) | PropertyValue::Float(_) => 4,
            PropertyValue::Bool(_) => 1,
            PropertyValue::String(s) => s.len() + 1,
            PropertyValue::ByteVector3(_) => 3,
            PropertyValue::ByteVector4(_) => 4,
            PropertyValue::Vector3(_) => 12,
            PropertyValue::Vector4(_) => 16,
            PropertyValue::ByteArray(b) => b.len(),
        }
    }

    fn read_write_sized(&mut self, rw: &mut ReadWriter<'_>, size: usize) -> Result<()> {
        match self {
            PropertyValue::String(s) => {
                let len = size.checked_sub(1).ok_or(GfsError::LengthMismatch {
                    what: "string property",
                    declared: size,
                    actual: 1,
                })?;
                rw.bytes(s, len, "string property")?;
                return rw.assert_u8(0, "string property terminator");
            }
            PropertyValue::ByteArray(b) => return rw.bytes(b, size, "byte array property"),
            _ => {}
        }
        let expected = self.size();
        if size != expected {
            return Err(GfsError::LengthMismatch {
                what: "property value",
                declared: size,
                actual: expected,
            });
        }
        match self {
            PropertyValue::Int(v) => rw.field(v),
            PropertyValue::Float(v) => rw.field(v),
            PropertyValue::Bool(v) => rw.field(v),
            PropertyValue::ByteVector3(v) => rw.field(v),
            PropertyValue::ByteVector4(v) => rw.field(v),
            PropertyValue::Vector3(v) => rw.field(v),
            PropertyValue::Vector4(v) => rw.field(v),
            PropertyValue::String(_) | PropertyValue::ByteArray(_) => Ok(()),
        }
    }
}

impl ReadWrite for Property {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let kind = rw.u32(self.value.kind())?;
        if rw.is_decoding() {
            self.value = PropertyValue::empty(kind)?;
        }
        rw.field(&mut self.name)?;
        let size = rw.len_u32(self.value.size(), "property size")?;
        self.value.read_write_sized(rw, size)
    }
}
