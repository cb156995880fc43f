//! Per-node attachment dispatch.

use serde::{Deserialize, Serialize};

use super::{Camera, Epl, EplLeaf, Light, Mesh, Morph};
use crate::error::{GfsError, Result};
use crate::rw::ReadWriter;

/// The typed payload a node may carry. The inner tag is derived from the
/// variant when encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    Mesh(Mesh),
    Camera(Camera),
    Light(Light),
    Epl(Epl),
    EplLeaf(EplLeaf),
    Morph(Morph),
}

type Constructor = fn() -> Attachment;

const ATTACHMENTS: &[(u32, Constructor)] = &[
    (4, || Attachment::Mesh(Mesh::default())),
    (5, || Attachment::Camera(Camera::default())),
    (6, || Attachment::Light(Light::default())),
    (7, || Attachment::Epl(Epl::default())),
    (8, || Attachment::EplLeaf(EplLeaf::default())),
    (9, || Attachment::Morph(Morph::default())),
];

impl Default for Attachment {
    fn default() -> Self {
        Attachment::Mesh(Mesh::default())
    }
}

impl Attachment {
    pub fn tag(&self) -> u32 {
        match self {
            Attachment::Mesh(_) => 4,
            Attachment::Camera(_) => 5,
            Attachment::Light(_) => 6,
            Attachment::Epl(_) => 7,
            Attachment::EplLeaf(_) => 8,
            Attachment::Morph(_) => 9,
        }
    }

    /// Moves the tag and body; `node` is the depth-first index of the owning
    /// node, reported when the tag is unknown.
    pub(crate) fn read_write_on(&mut self, rw: &mut ReadWriter<'_>, node: usize) -> Result<()> {
        let tag = rw.u32(self.tag())?;
        if rw.is_decoding() {
            let (_, construct) = ATTACHMENTS
                .iter()
                .find(|(known, _)| *known == tag)
                .ok_or(GfsError::UnrecognizedAttachment { tag, node })?;
            *self = construct();
        }
        match self {
            Attachment::Mesh(mesh) => rw.field(mesh),
            Attachment::Camera(camera) => rw.field(camera),
            Attachment::Light(light) => rw.field(light),
            Attachment::Epl(epl) => rw.field(epl),
            Attachment::EplLeaf(leaf) => rw.field(leaf),
            Attachment::Morph(morph) => rw.field(morph),
        }
    }
}
