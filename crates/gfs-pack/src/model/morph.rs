use serde::{Deserialize, Serialize};

use crate::common::ObjectName;
use crate::error::Result;
use crate::rw::{ReadWrite, ReadWriter};

/// Initial blend weights for the morph targets of a named mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Morph {
    pub initial_weights: Vec<f32>,
    pub mesh_name: ObjectName,
}

impl ReadWrite for Morph {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.counted_u32(&mut self.initial_weights, "morph weights")?;
        rw.field(&mut self.mesh_name)
    }
}
