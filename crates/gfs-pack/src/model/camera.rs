use serde::{Deserialize, Serialize};

use crate::common::Matrix4x3;
use crate::error::Result;
use crate::rw::{ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub view: Matrix4x3,
    pub near: f32,
    pub far: f32,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub unknown_0x190: Option<f32>,
}

impl ReadWrite for Camera {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        rw.field(&mut self.view)?;
        self.near = rw.f32(self.near)?;
        self.far = rw.f32(self.far)?;
        self.fov = rw.f32(self.fov)?;
        self.aspect_ratio = rw.f32(self.aspect_ratio)?;
        let gate = rw.version().has_camera_unknown_0x190();
        rw.gated(gate, &mut self.unknown_0x190, "camera unknown_0x190")
    }
}
