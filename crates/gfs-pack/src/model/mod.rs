//! Model container (`0x00010003`): optional skin and bounds, then the scene
//! node tree with per-node attachments.

mod attachment;
mod camera;
mod effect;
mod light;
mod mesh;
mod morph;
mod node;

pub use attachment::Attachment;
pub use camera::Camera;
pub use effect::{EmbeddedFile, Epl, EplHelper, EplLeaf, EplLeafBody};
pub use light::{Falloff, Light, LightKind};
pub use mesh::{IndexFormat, Mesh, MorphTarget, MorphTargets, Vertex, VertexWeights};
pub use morph::Morph;
pub use node::Node;

use serde::{Deserialize, Serialize};

use crate::common::{BoundingBox, BoundingSphere, Matrix4x3};
use crate::error::{GfsError, Result};
use crate::errorlog::ErrorLog;
use crate::rw::{ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPayload {
    pub flags: u32,
    pub skin: Option<Skin>,
    pub bounding_box: Option<BoundingBox>,
    pub bounding_sphere: Option<BoundingSphere>,
    pub root: Node,
}

impl ModelPayload {
    pub const HAS_BOUNDING_BOX: u32 = 1 << 0;
    pub const HAS_BOUNDING_SPHERE: u32 = 1 << 1;
    pub const HAS_SKIN: u32 = 1 << 2;

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Reports skin entries that point outside the node tree.
    pub fn validate(&self, log: &mut ErrorLog) {
        let Some(skin) = &self.skin else {
            return;
        };
        let nodes = self.node_count();
        for (bone, &index) in skin.node_indices.iter().enumerate() {
            if index as usize >= nodes {
                log.log_warning(format!(
                    "skin bone {bone} refers to node {index}, but the model has {nodes} nodes"
                ));
            }
        }
    }
}

impl ReadWrite for ModelPayload {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        let flags = self.flags;
        rw.gated(flags & Self::HAS_SKIN != 0, &mut self.skin, "skin")?;
        rw.gated(
            flags & Self::HAS_BOUNDING_BOX != 0,
            &mut self.bounding_box,
            "model bounding box",
        )?;
        rw.gated(
            flags & Self::HAS_BOUNDING_SPHERE != 0,
            &mut self.bounding_sphere,
            "model bounding sphere",
        )?;
        rw.field(&mut self.root)
    }
}

/// Inverse bind matrices and the node each bone is bound to, stored as two
/// parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub inverse_bind_matrices: Vec<Matrix4x3>,
    pub node_indices: Vec<u16>,
}

impl ReadWrite for Skin {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        if !rw.is_decoding() && self.inverse_bind_matrices.len() != self.node_indices.len() {
            return Err(GfsError::Inconsistent {
                what: format!(
                    "skin has {} matrices but {} node indices",
                    self.inverse_bind_matrices.len(),
                    self.node_indices.len()
                ),
            });
        }
        let count = rw.len_u32(self.inverse_bind_matrices.len(), "skin bones")?;
        rw.seq(&mut self.inverse_bind_matrices, count)?;
        rw.seq(&mut self.node_indices, count)
    }
}
