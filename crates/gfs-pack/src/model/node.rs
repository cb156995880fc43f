use serde::{Deserialize, Serialize};

use crate::common::{ObjectName, Property, Quat, Vec3};
use crate::error::{GfsError, Result};
use crate::model::Attachment;
use crate::rw::{ReadWrite, ReadWriter};

/// One scene node. Children are stored depth-first after the node's own
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: ObjectName,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub attachment: Option<Attachment>,
    /// `None` when the version predates node properties or the node has none.
    pub properties: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties_marker: Option<u8>,
    pub unknown_float: Option<f32>,
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: ObjectName::default(),
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
            attachment: None,
            properties: None,
            properties_marker: None,
            unknown_float: None,
            children: Vec::new(),
        }
    }
}

impl Node {
    /// Size of the subtree rooted here.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first iterator over the subtree, this node first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    fn read_write_indexed(&mut self, rw: &mut ReadWriter<'_>, next: &mut usize) -> Result<()> {
        let index = *next;
        *next += 1;

        rw.field(&mut self.name)?;
        rw.field(&mut self.position)?;
        rw.field(&mut self.rotation)?;
        rw.field(&mut self.scale)?;

        let count = rw.len_u32(self.attachment.is_some() as usize, "attachments")?;
        if count > 1 {
            return Err(GfsError::TooMany {
                what: "attachments on one node",
                count,
                max: 1,
            });
        }
        rw.gated_with(count == 1, &mut self.attachment, "attachment", |rw, a| {
            a.read_write_on(rw, index)
        })?;

        if rw.version().has_node_properties() {
            let has = rw.presence(self.properties.is_some(), &mut self.properties_marker)?;
            rw.gated_with(has, &mut self.properties, "properties", |rw, props| {
                rw.counted_u32(props, "properties")
            })?;
        } else if rw.is_decoding() {
            self.properties = None;
        }
        let gate = rw.version().has_node_unknown_float();
        rw.gated(gate, &mut self.unknown_float, "node unknown float")?;

        let children = rw.len_u32(self.children.len(), "children")?;
        rw.nested(|rw| {
            rw.seq_with(&mut self.children, children, |rw, child| {
                child.read_write_indexed(rw, next)
            })
        })
    }
}

impl ReadWrite for Node {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.read_write_indexed(rw, &mut 0)
    }
}
