//! Mesh attachment.
//!
//! Which vertex components are stored is decided by `vertex_format`, and
//! which optional blocks follow the vertices by `flags`. Both words are kept
//! exactly as decoded; on encode every block they announce must be present.

use serde::{Deserialize, Serialize};

use crate::common::{BoundingBox, BoundingSphere, ObjectName, Vec3};
use crate::error::{GfsError, Result};
use crate::rw::{read_write_fields, ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub flags: u32,
    pub vertex_format: u32,
    pub index_format: Option<IndexFormat>,
    pub unknown_0x14: Option<u32>,
    pub vertices: Vec<Vertex>,
    pub morph_targets: Option<MorphTargets>,
    pub triangles: Vec<[u32; 3]>,
    pub material: Option<ObjectName>,
    pub bounding_box: Option<BoundingBox>,
    pub bounding_sphere: Option<BoundingSphere>,
    pub unknown_floats: Option<[f32; 2]>,
}

impl Mesh {
    pub const HAS_WEIGHTS: u32 = 1 << 0;
    pub const HAS_MATERIAL: u32 = 1 << 1;
    pub const HAS_TRIANGLES: u32 = 1 << 2;
    pub const HAS_BOUNDING_BOX: u32 = 1 << 3;
    pub const HAS_BOUNDING_SPHERE: u32 = 1 << 4;
    pub const HAS_MORPHS: u32 = 1 << 6;
    pub const HAS_UNKNOWN_FLOATS: u32 = 1 << 12;

    fn has(&self, bit: u32) -> bool {
        self.flags & bit != 0
    }
}

impl ReadWrite for Mesh {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        self.vertex_format = rw.u32(self.vertex_format)?;

        let has_triangles = self.has(Self::HAS_TRIANGLES);
        rw.gated(has_triangles, &mut self.index_format, "index format")?;
        let triangle_count = if has_triangles {
            rw.len_u32(self.triangles.len(), "triangles")?
        } else {
            0
        };
        let vertex_count = rw.len_u32(self.vertices.len(), "vertices")?;
        let gate = rw.version().has_mesh_unknown_0x14();
        rw.gated(gate, &mut self.unknown_0x14, "mesh unknown_0x14")?;

        let format = self.vertex_format;
        let weights = self.has(Self::HAS_WEIGHTS);
        rw.seq_with(&mut self.vertices, vertex_count, |rw, vertex| {
            vertex.read_write_as(rw, format, weights)
        })?;

        rw.gated(self.has(Self::HAS_MORPHS), &mut self.morph_targets, "morph targets")?;

        let index_format = self.index_format.unwrap_or_default();
        rw.seq_with(&mut self.triangles, triangle_count, |rw, triangle| {
            for index in triangle.iter_mut() {
                *index = index_format.index(rw, *index)?;
            }
            Ok(())
        })?;

        rw.gated(self.has(Self::HAS_MATERIAL), &mut self.material, "mesh material")?;
        rw.gated(
            self.has(Self::HAS_BOUNDING_BOX),
            &mut self.bounding_box,
            "mesh bounding box",
        )?;
        rw.gated(
            self.has(Self::HAS_BOUNDING_SPHERE),
            &mut self.bounding_sphere,
            "mesh bounding sphere",
        )?;
        rw.gated(
            self.has(Self::HAS_UNKNOWN_FLOATS),
            &mut self.unknown_floats,
            "mesh unknown floats",
        )
    }
}

/// Width of each triangle index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFormat {
    #[default]
    U16,
    U32,
}

impl IndexFormat {
    fn tag(self) -> u16 {
        match self {
            IndexFormat::U16 => 1,
            IndexFormat::U32 => 2,
        }
    }

    fn index(self, rw: &mut ReadWriter<'_>, value: u32) -> Result<u32> {
        match self {
            IndexFormat::U32 => rw.u32(value),
            IndexFormat::U16 => {
                let narrow = u16::try_from(value).map_err(|_| GfsError::TooMany {
                    what: "vertex index for 16-bit triangles",
                    count: value as usize,
                    max: u16::MAX as usize,
                })?;
                Ok(rw.u16(narrow)? as u32)
            }
        }
    }
}

impl ReadWrite for IndexFormat {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        *self = match rw.u16(self.tag())? {
            1 => IndexFormat::U16,
            2 => IndexFormat::U32,
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "triangle index format",
                    value: value as u32,
                })
            }
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Option<Vec3>,
    pub normal: Option<Vec3>,
    pub tangent: Option<Vec3>,
    pub binormal: Option<Vec3>,
    pub color0: Option<u32>,
    pub texcoords: [Option<[f32; 2]>; 8],
    pub color1: Option<u32>,
    pub weights: Option<VertexWeights>,
}

impl Vertex {
    pub const POSITION: u32 = 1 << 1;
    pub const NORMAL: u32 = 1 << 4;
    pub const COLOR0: u32 = 1 << 6;
    pub const TEXCOORD0: u32 = 1 << 8;
    pub const TANGENT: u32 = 1 << 28;
    pub const BINORMAL: u32 = 1 << 29;
    pub const COLOR1: u32 = 1 << 30;

    fn read_write_as(&mut self, rw: &mut ReadWriter<'_>, format: u32, weights: bool) -> Result<()> {
        let on = |bit: u32| format & bit != 0;
        rw.gated(on(Self::POSITION), &mut self.position, "vertex position")?;
        rw.gated(on(Self::NORMAL), &mut self.normal, "vertex normal")?;
        rw.gated(on(Self::TANGENT), &mut self.tangent, "vertex tangent")?;
        rw.gated(on(Self::BINORMAL), &mut self.binormal, "vertex binormal")?;
        rw.gated(on(Self::COLOR0), &mut self.color0, "vertex color0")?;
        for (layer, texcoord) in self.texcoords.iter_mut().enumerate() {
            rw.gated(on(Self::TEXCOORD0 << layer), texcoord, "vertex texcoord")?;
        }
        rw.gated(on(Self::COLOR1), &mut self.color1, "vertex color1")?;
        rw.gated(weights, &mut self.weights, "vertex weights")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexWeights {
    pub weights: [f32; 4],
    pub indices: [u8; 4],
}

read_write_fields!(VertexWeights { weights, indices });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphTargets {
    pub flags: u32,
    pub targets: Vec<MorphTarget>,
}

impl ReadWrite for MorphTargets {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        rw.counted_u32(&mut self.targets, "morph targets")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorphTarget {
    pub flags: u32,
    pub positions: Vec<Vec3>,
}

impl ReadWrite for MorphTarget {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        rw.counted_u32(&mut self.positions, "morph target positions")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;
    use crate::version::GfsVersion;

    fn triangle_mesh() -> Mesh {
        let vertex = |x: f32| Vertex {
            position: Some([x, 0.0, 0.0]),
            texcoords: [Some([x, 1.0]), None, None, None, None, None, None, None],
            ..Vertex::default()
        };
        Mesh {
            flags: Mesh::HAS_TRIANGLES | Mesh::HAS_MATERIAL,
            vertex_format: Vertex::POSITION | Vertex::TEXCOORD0,
            index_format: Some(IndexFormat::U16),
            unknown_0x14: Some(0),
            vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0)],
            triangles: vec![[0, 1, 2]],
            material: Some(ObjectName::new("mat", 7)),
            ..Mesh::default()
        }
    }

    fn encode(mesh: &mut Mesh, version: u32) -> Result<Vec<u8>> {
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        rw.with_version(GfsVersion(version), |rw| rw.field(mesh))?;
        Ok(rw.finish().0)
    }

    #[test]
    fn triangle_mesh_roundtrip() {
        let mut mesh = triangle_mesh();
        let bytes = encode(&mut mesh, 0x0110_4030).unwrap();
        // header, index format and count, vertex count, unknown_0x14,
        // vertices, triangles, material name with hash
        assert_eq!(bytes.len(), 8 + 6 + 4 + 4 + 3 * 20 + 6 + 9);

        let mut rw = ReadWriter::decoder(&bytes, &CodecOptions::default());
        let mut decoded = Mesh::default();
        rw.with_version(GfsVersion(0x0110_4030), |rw| rw.field(&mut decoded))
            .unwrap();
        assert_eq!(decoded, mesh);
    }

    #[test]
    fn unknown_0x14_is_version_gated() {
        let mut mesh = triangle_mesh();
        let at_gate = encode(&mut mesh, 0x0110_3020).unwrap();
        let above = encode(&mut mesh, 0x0110_3021).unwrap();
        assert_eq!(above.len() - at_gate.len(), 4);
    }

    #[test]
    fn sixteen_bit_indices_must_fit() {
        let mut mesh = triangle_mesh();
        mesh.triangles[0][2] = 70_000;
        assert!(matches!(
            encode(&mut mesh, 0x0110_4030),
            Err(GfsError::TooMany { .. })
        ));
    }

    #[test]
    fn announced_block_must_be_present() {
        let mut mesh = triangle_mesh();
        mesh.material = None;
        assert!(matches!(
            encode(&mut mesh, 0x0110_4030),
            Err(GfsError::MissingField { what: "mesh material" })
        ));
    }
}
