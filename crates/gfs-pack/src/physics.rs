//! Physics container (`0x000100F9`): cloth/hair bones, colliders, and the
//! links that chain bones together.
//!
//! Links refer to bones by index. Indices are validated into an
//! [`ErrorLog`], never dereferenced: an unset link (`-1`) is an error the
//! user must fix before export, an index past the bone list is a warning.

use serde::{Deserialize, Serialize};

use crate::common::{Matrix4x3, ObjectName};
use crate::error::{GfsError, Result};
use crate::errorlog::ErrorLog;
use crate::rw::{read_write_fields, ReadWrite, ReadWriter};

/// Index value of a link end that points at no bone.
pub const UNSET_BONE: i16 = -1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsPayload {
    pub bones: Vec<PhysicsBone>,
    pub colliders: Vec<Collider>,
    pub links: Vec<PhysicsBoneLink>,
}

impl ReadWrite for PhysicsPayload {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let bones = rw.len_u8(self.bones.len(), "physics bones")?;
        let colliders = rw.len_u8(self.colliders.len(), "colliders")?;
        let links = rw.len_u16(self.links.len(), "physics bone links")?;
        rw.seq(&mut self.bones, bones)?;
        rw.seq(&mut self.colliders, colliders)?;
        rw.seq(&mut self.links, links)
    }
}

impl PhysicsPayload {
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty() && self.colliders.is_empty() && self.links.is_empty()
    }

    /// Logs every link end that is unset or outside the bone list.
    pub fn validate(&self, log: &mut ErrorLog) {
        let count = self.bones.len();
        for (i, link) in self.links.iter().enumerate() {
            for (end, index) in [("parent", link.parent), ("child", link.child)] {
                if index == UNSET_BONE {
                    log.log_error(format!(
                        "physics link {i} has a {end} bone index of -1; remove the link or set it to a valid physics bone index"
                    ));
                } else if index < 0 || index as usize >= count {
                    log.log_warning(format!(
                        "physics link {i} has a {end} bone index {index} outside the {count} physics bones"
                    ));
                }
            }
        }
    }

    /// Drops named bones and colliders for which `exists` is false. Links to
    /// a dropped bone are removed and later indices are shifted down.
    pub fn retain_named(&mut self, exists: impl Fn(&ObjectName) -> bool, log: &mut ErrorLog) {
        for i in (0..self.bones.len()).rev() {
            let Some(name) = &self.bones[i].name else {
                continue;
            };
            if exists(name) {
                continue;
            }
            log.log_warning(format!(
                "bone physics attached to missing bone '{}' was not exported",
                name.to_string_lossy()
            ));
            self.bones.remove(i);
            let removed = i as i16;
            self.links
                .retain(|link| link.parent != removed && link.child != removed);
            for link in &mut self.links {
                if link.parent > removed {
                    link.parent -= 1;
                }
                if link.child > removed {
                    link.child -= 1;
                }
            }
        }
        self.colliders.retain(|collider| match &collider.name {
            Some(name) if !exists(name) => {
                log.log_warning(format!(
                    "collider attached to missing bone '{}' was not exported",
                    name.to_string_lossy()
                ));
                false
            }
            _ => true,
        });
    }
}

/// A simulated bone. Bones without a name carry a matrix in its place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBone {
    pub unknown_0x00: f32,
    pub unknown_0x04: f32,
    pub unknown_0x08: f32,
    pub unknown_0x0c: f32,
    pub name: Option<ObjectName>,
    pub nameless_data: Option<Matrix4x3>,
    /// `has_name` byte when it was neither 0 nor 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_marker: Option<u8>,
}

impl ReadWrite for PhysicsBone {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.unknown_0x00 = rw.f32(self.unknown_0x00)?;
        self.unknown_0x04 = rw.f32(self.unknown_0x04)?;
        self.unknown_0x08 = rw.f32(self.unknown_0x08)?;
        self.unknown_0x0c = rw.f32(self.unknown_0x0c)?;
        let named = rw.presence(self.name.is_some(), &mut self.name_marker)?;
        rw.gated(named, &mut self.name, "physics bone name")?;
        rw.gated(!named, &mut self.nameless_data, "physics bone nameless data")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    #[default]
    Sphere,
    Capsule {
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub radius: f32,
    pub transform: [f32; 16],
    pub name: Option<ObjectName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_marker: Option<u8>,
}

impl ReadWrite for Collider {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let tag = match self.shape {
            ColliderShape::Sphere => 0,
            ColliderShape::Capsule { .. } => 1,
        };
        let tag = rw.u8(tag)?;
        if rw.is_decoding() {
            self.shape = match tag {
                0 => ColliderShape::Sphere,
                1 => ColliderShape::Capsule { height: 0.0 },
                value => {
                    return Err(GfsError::UnrecognizedVariant {
                        what: "collider type",
                        value: value as u32,
                    })
                }
            };
        }
        self.radius = rw.f32(self.radius)?;
        if let ColliderShape::Capsule { height } = &mut self.shape {
            *height = rw.f32(*height)?;
        }
        rw.field(&mut self.transform)?;
        let named = rw.presence(self.name.is_some(), &mut self.name_marker)?;
        rw.gated(named, &mut self.name, "collider name")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBoneLink {
    pub mass: f32,
    pub unknown_0x04: f32,
    pub radius: f32,
    pub parent: i16,
    pub child: i16,
}

impl Default for PhysicsBoneLink {
    fn default() -> Self {
        Self {
            mass: 0.0,
            unknown_0x04: 0.0,
            radius: 0.0,
            parent: UNSET_BONE,
            child: UNSET_BONE,
        }
    }
}

read_write_fields!(PhysicsBoneLink {
    mass,
    unknown_0x04,
    radius,
    parent,
    child,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn named_bone(name: &str) -> PhysicsBone {
        PhysicsBone {
            name: Some(ObjectName::new(name, 0)),
            ..PhysicsBone::default()
        }
    }

    fn link(parent: i16, child: i16) -> PhysicsBoneLink {
        PhysicsBoneLink {
            parent,
            child,
            ..PhysicsBoneLink::default()
        }
    }

    #[test]
    fn validate_reports_unset_and_out_of_range() {
        let payload = PhysicsPayload {
            bones: vec![named_bone("a"), named_bone("b")],
            colliders: Vec::new(),
            links: vec![link(0, 1), link(-1, 1), link(0, 2)],
        };
        let mut log = ErrorLog::new();
        payload.validate(&mut log);
        assert_eq!(log.errors().count(), 1);
        assert_eq!(log.warnings().count(), 1);
        assert!(log.errors().all(|d| d.message.contains("link 1")));
        assert!(log.warnings().all(|d| d.message.contains("link 2")));
    }

    #[test]
    fn retain_named_reindexes_links() {
        let mut payload = PhysicsPayload {
            bones: vec![named_bone("a"), named_bone("gone"), named_bone("c")],
            colliders: vec![Collider {
                name: Some(ObjectName::new("gone", 0)),
                ..Collider::default()
            }],
            links: vec![link(0, 1), link(0, 2)],
        };
        let mut log = ErrorLog::new();
        payload.retain_named(|name| name.bytes != b"gone", &mut log);
        assert_eq!(payload.bones.len(), 2);
        assert!(payload.colliders.is_empty());
        assert_eq!(payload.links, vec![link(0, 1)]);
        assert_eq!(log.warnings().count(), 2);
    }
}
