use serde::{Deserialize, Serialize};

use crate::common::Color;
use crate::error::{GfsError, Result};
use crate::rw::{ReadWrite, ReadWriter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub flags: u32,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub kind: LightKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    #[default]
    Directional,
    Point {
        falloff: Falloff,
    },
    Spot {
        falloff: Falloff,
        inner_angle: f32,
        outer_angle: f32,
    },
}

/// Distance attenuation. Which shape is stored is decided by
/// [`Light::ALT_FALLOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Falloff {
    Range { start: f32, end: f32 },
    Polynomial { constant: f32, linear: f32, quadratic: f32 },
}

impl Default for Falloff {
    fn default() -> Self {
        Falloff::Polynomial {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl Light {
    pub const ALT_FALLOFF: u32 = 1 << 1;
}

impl LightKind {
    fn tag(&self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point { .. } => 1,
            LightKind::Spot { .. } => 2,
        }
    }

    fn empty(tag: u32) -> Result<Self> {
        Ok(match tag {
            0 => LightKind::Directional,
            1 => LightKind::Point {
                falloff: Falloff::default(),
            },
            2 => LightKind::Spot {
                falloff: Falloff::default(),
                inner_angle: 0.0,
                outer_angle: 0.0,
            },
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "light type",
                    value,
                })
            }
        })
    }
}

impl Falloff {
    fn read_write_shaped(&mut self, rw: &mut ReadWriter<'_>, range: bool) -> Result<()> {
        if rw.is_decoding() {
            *self = if range {
                Falloff::Range { start: 0.0, end: 0.0 }
            } else {
                Falloff::default()
            };
        }
        match (self, range) {
            (Falloff::Range { start, end }, true) => {
                *start = rw.f32(*start)?;
                *end = rw.f32(*end)?;
                Ok(())
            }
            (
                Falloff::Polynomial {
                    constant,
                    linear,
                    quadratic,
                },
                false,
            ) => {
                *constant = rw.f32(*constant)?;
                *linear = rw.f32(*linear)?;
                *quadratic = rw.f32(*quadratic)?;
                Ok(())
            }
            _ => Err(GfsError::Inconsistent {
                what: "light falloff shape disagrees with its flags".to_owned(),
            }),
        }
    }
}

impl ReadWrite for Light {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        self.flags = rw.u32(self.flags)?;
        let tag = rw.u32(self.kind.tag())?;
        if rw.is_decoding() {
            self.kind = LightKind::empty(tag)?;
        }
        rw.field(&mut self.ambient)?;
        rw.field(&mut self.diffuse)?;
        rw.field(&mut self.specular)?;

        let range = self.flags & Self::ALT_FALLOFF != 0;
        match &mut self.kind {
            LightKind::Directional => Ok(()),
            LightKind::Point { falloff } => falloff.read_write_shaped(rw, range),
            LightKind::Spot {
                falloff,
                inner_angle,
                outer_angle,
            } => {
                falloff.read_write_shaped(rw, range)?;
                *inner_angle = rw.f32(*inner_angle)?;
                *outer_angle = rw.f32(*outer_angle)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;

    #[test]
    fn falloff_shape_must_match_flags() {
        let mut light = Light {
            flags: Light::ALT_FALLOFF,
            kind: LightKind::Point {
                falloff: Falloff::default(),
            },
            ..Light::default()
        };
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        assert!(matches!(
            rw.field(&mut light),
            Err(GfsError::Inconsistent { .. })
        ));
    }

    #[test]
    fn spot_light_roundtrip() {
        let mut light = Light {
            flags: Light::ALT_FALLOFF,
            ambient: [0.1, 0.2, 0.3, 1.0],
            kind: LightKind::Spot {
                falloff: Falloff::Range { start: 1.0, end: 8.0 },
                inner_angle: 0.3,
                outer_angle: 0.6,
            },
            ..Light::default()
        };
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        rw.field(&mut light).unwrap();
        let bytes = rw.finish().0;
        assert_eq!(bytes.len(), 4 + 4 + 48 + 8 + 8);

        let mut rw = ReadWriter::decoder(&bytes, &CodecOptions::default());
        let mut decoded = Light::default();
        rw.field(&mut decoded).unwrap();
        assert_eq!(decoded, light);
    }

    #[test]
    fn unknown_light_type_fails() {
        let mut bytes = vec![0, 0, 0, 0, 0, 0, 0, 3];
        bytes.extend([0; 48]);
        let mut rw = ReadWriter::decoder(&bytes, &CodecOptions::default());
        assert!(matches!(
            rw.field(&mut Light::default()),
            Err(GfsError::UnrecognizedVariant { value: 3, .. })
        ));
    }
}
