//! Animations container (`0x000100FD`).
//!
//! Node tracks are decoded into keyframe layers. Material, camera, morph and
//! type-5 tracks are kept as opaque bodies so they survive a round trip even
//! though nothing here interprets them.

use serde::{Deserialize, Serialize};

use crate::blob::RawBytes;
use crate::common::{BoundingBox, ObjectName, Property, Quat, Vec3};
use crate::error::{GfsError, Result};
use crate::model::Epl;
use crate::rw::{read_write_fields, ReadWrite, ReadWriter, SizeOrigin};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationPayload {
    pub flags: Option<u32>,
    pub animations: Vec<Animation>,
    pub blend_animations: Vec<Animation>,
    pub lookat: Option<Box<LookAtAnimations>>,
}

impl AnimationPayload {
    pub const HAS_LOOKAT: u32 = 1 << 2;
}

impl ReadWrite for AnimationPayload {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let gate = rw.version().has_animation_pack_flags();
        rw.gated(gate, &mut self.flags, "animation pack flags")?;
        rw.counted_u32(&mut self.animations, "animations")?;
        rw.counted_u32(&mut self.blend_animations, "blend animations")?;
        let lookat = self.flags.unwrap_or(0) & Self::HAS_LOOKAT != 0;
        rw.nested(|rw| rw.gated(lookat, &mut self.lookat, "lookat animations"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub flags: Option<u32>,
    pub duration: f32,
    pub tracks: Vec<Track>,
    pub epls: Option<Vec<AnimationEpl>>,
    pub bounding_box: Option<BoundingBox>,
    pub properties: Option<Vec<Property>>,
    pub speed: Option<f32>,
    pub lookat: Option<Box<LookAtAnimations>>,
}

impl Animation {
    pub const HAS_PROPERTIES: u32 = 1 << 23;
    pub const HAS_SPEED: u32 = 1 << 25;
    pub const HAS_LOOKAT: u32 = 1 << 28;
    pub const HAS_EPLS: u32 = 1 << 29;
    pub const HAS_BOUNDING_BOX: u32 = 1 << 30;

    /// Tracks that no host maps onto its own animation model.
    pub fn residual_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .iter()
            .filter(|track| !matches!(track.data, TrackData::Node(_)))
    }
}

impl ReadWrite for Animation {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let gate = rw.version().has_animation_flags();
        rw.gated(gate, &mut self.flags, "animation flags")?;
        let flags = self.flags.unwrap_or(0);
        let has = |bit: u32| flags & bit != 0;

        self.duration = rw.f32(self.duration)?;
        rw.counted_u32(&mut self.tracks, "animation tracks")?;
        rw.gated_with(has(Self::HAS_EPLS), &mut self.epls, "animation effects", |rw, epls| {
            rw.counted_u32(epls, "animation effects")
        })?;
        rw.gated(
            has(Self::HAS_BOUNDING_BOX),
            &mut self.bounding_box,
            "animation bounding box",
        )?;
        rw.gated_with(
            has(Self::HAS_PROPERTIES),
            &mut self.properties,
            "animation properties",
            |rw, properties| rw.counted_u32(properties, "animation properties"),
        )?;
        rw.gated(has(Self::HAS_SPEED), &mut self.speed, "animation speed")?;
        rw.nested(|rw| rw.gated(has(Self::HAS_LOOKAT), &mut self.lookat, "lookat animations"))
    }
}

/// An effect fired by an animation on the node at `node_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationEpl {
    pub node_index: u32,
    pub epl: Epl,
}

read_write_fields!(AnimationEpl { node_index, epl });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookAtAnimations {
    pub right: Animation,
    pub right_factor: f32,
    pub left: Animation,
    pub left_factor: f32,
    pub up: Animation,
    pub up_factor: f32,
    pub down: Animation,
    pub down_factor: f32,
}

read_write_fields!(LookAtAnimations {
    right,
    right_factor,
    left,
    left_factor,
    up,
    up_factor,
    down,
    down_factor,
});

/// One animated target. `size` counts the bytes after the size field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub target_id: u32,
    pub name: ObjectName,
    pub size: u32,
    pub data: TrackData,
    pub tail: Option<RawBytes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackData {
    Node(Vec<KeyframeLayer>),
    Material(RawBytes),
    Camera(RawBytes),
    Morph(RawBytes),
    Type5(RawBytes),
}

impl Default for TrackData {
    fn default() -> Self {
        TrackData::Node(Vec::new())
    }
}

impl TrackData {
    pub fn kind(&self) -> u16 {
        match self {
            TrackData::Node(_) => 1,
            TrackData::Material(_) => 2,
            TrackData::Camera(_) => 3,
            TrackData::Morph(_) => 4,
            TrackData::Type5(_) => 5,
        }
    }

    fn empty(kind: u16) -> Result<Self> {
        Ok(match kind {
            1 => TrackData::Node(Vec::new()),
            2 => TrackData::Material(RawBytes::default()),
            3 => TrackData::Camera(RawBytes::default()),
            4 => TrackData::Morph(RawBytes::default()),
            5 => TrackData::Type5(RawBytes::default()),
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "animation track type",
                    value: value as u32,
                })
            }
        })
    }
}

impl ReadWrite for Track {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let kind = rw.u16(self.data.kind())?;
        if rw.is_decoding() {
            self.data = TrackData::empty(kind)?;
        }
        self.target_id = rw.u32(self.target_id)?;
        rw.field(&mut self.name)?;
        rw.sized(
            &mut self.size,
            SizeOrigin::AfterField,
            "animation track",
            &mut self.tail,
            |rw| match &mut self.data {
                TrackData::Node(layers) => rw.counted_u32(layers, "keyframe layers"),
                TrackData::Material(bytes)
                | TrackData::Camera(bytes)
                | TrackData::Morph(bytes)
                | TrackData::Type5(bytes) => bytes.rest(rw),
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeLayer {
    pub times: Vec<f32>,
    pub values: Keyframes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Keyframes {
    Position(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
    Transform(Vec<Transform>),
    /// Quaternions stored as four half-precision floats.
    HalfRotation(Vec<[u16; 4]>),
}

impl Default for Keyframes {
    fn default() -> Self {
        Keyframes::Position(Vec::new())
    }
}

impl Keyframes {
    pub fn key_type(&self) -> u32 {
        match self {
            Keyframes::Position(_) => 1,
            Keyframes::Rotation(_) => 2,
            Keyframes::Scale(_) => 3,
            Keyframes::Transform(_) => 4,
            Keyframes::HalfRotation(_) => 5,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Keyframes::Position(v) | Keyframes::Scale(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Transform(v) => v.len(),
            Keyframes::HalfRotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn empty(key_type: u32) -> Result<Self> {
        Ok(match key_type {
            1 => Keyframes::Position(Vec::new()),
            2 => Keyframes::Rotation(Vec::new()),
            3 => Keyframes::Scale(Vec::new()),
            4 => Keyframes::Transform(Vec::new()),
            5 => Keyframes::HalfRotation(Vec::new()),
            value => {
                return Err(GfsError::UnrecognizedVariant {
                    what: "keyframe type",
                    value,
                })
            }
        })
    }
}

impl ReadWrite for KeyframeLayer {
    fn read_write(&mut self, rw: &mut ReadWriter<'_>) -> Result<()> {
        let key_type = rw.u32(self.values.key_type())?;
        if rw.is_decoding() {
            self.values = Keyframes::empty(key_type)?;
        } else if self.values.len() != self.times.len() {
            return Err(GfsError::Inconsistent {
                what: format!(
                    "keyframe layer has {} times but {} values",
                    self.times.len(),
                    self.values.len()
                ),
            });
        }
        let count = rw.len_u32(self.times.len(), "keyframes")?;
        rw.seq(&mut self.times, count)?;
        match &mut self.values {
            Keyframes::Position(v) | Keyframes::Scale(v) => rw.seq(v, count),
            Keyframes::Rotation(v) => rw.seq(v, count),
            Keyframes::Transform(v) => rw.seq(v, count),
            Keyframes::HalfRotation(v) => rw.seq(v, count),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

read_write_fields!(Transform {
    position,
    rotation,
    scale
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodecOptions;
    use crate::version::GfsVersion;

    fn encode<T: ReadWrite>(value: &mut T, version: u32) -> Result<Vec<u8>> {
        let mut rw = ReadWriter::encoder(&CodecOptions::default());
        rw.with_version(GfsVersion(version), |rw| rw.field(value))?;
        Ok(rw.finish().0)
    }

    fn decode<T: ReadWrite + Default>(bytes: &[u8], version: u32) -> T {
        let mut rw = ReadWriter::decoder(bytes, &CodecOptions::default());
        let mut value = T::default();
        rw.with_version(GfsVersion(version), |rw| rw.field(&mut value))
            .unwrap();
        value
    }

    fn try_decode<T: ReadWrite + Default>(bytes: &[u8]) -> Result<T> {
        let mut rw = ReadWriter::decoder(bytes, &CodecOptions::default());
        let mut value = T::default();
        rw.with_version(GfsVersion(0x0110_4030), |rw| rw.field(&mut value))?;
        Ok(value)
    }

    #[test]
    fn unknown_keyframe_type_is_fatal() {
        let mut bytes = 6u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(
            try_decode::<KeyframeLayer>(&bytes),
            Err(GfsError::UnrecognizedVariant {
                what: "keyframe type",
                value: 6,
            })
        ));
    }

    #[test]
    fn unknown_track_kind_is_fatal() {
        let mut bytes = 0u16.to_be_bytes().to_vec();
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(
            try_decode::<Track>(&bytes),
            Err(GfsError::UnrecognizedVariant {
                what: "animation track type",
                value: 0,
            })
        ));
    }

    fn node_track() -> Track {
        Track {
            target_id: 3,
            name: ObjectName::new("spine", 5),
            data: TrackData::Node(vec![KeyframeLayer {
                times: vec![0.0, 0.5],
                values: Keyframes::Rotation(vec![[0.0, 0.0, 0.0, 1.0]; 2]),
            }]),
            ..Track::default()
        }
    }

    #[test]
    fn node_track_size_counts_layers() {
        let mut track = node_track();
        encode(&mut track, 0x0110_4030).unwrap();
        assert_eq!(track.size, 4 + 4 + 4 + 2 * 4 + 2 * 16);
    }

    #[test]
    fn residual_track_roundtrips_opaquely() {
        let mut animation = Animation {
            flags: Some(0),
            duration: 2.0,
            tracks: vec![
                node_track(),
                Track {
                    target_id: 9,
                    name: ObjectName::new("mat", 1),
                    data: TrackData::Material(RawBytes::new(vec![1, 2, 3, 4, 5, 6])),
                    ..Track::default()
                },
            ],
            ..Animation::default()
        };
        let bytes = encode(&mut animation, 0x0110_5100).unwrap();
        let decoded: Animation = decode(&bytes, 0x0110_5100);
        assert_eq!(decoded, animation);
        assert_eq!(decoded.residual_tracks().count(), 1);
    }

    #[test]
    fn optional_blocks_follow_flags() {
        let mut animation = Animation {
            flags: Some(Animation::HAS_SPEED | Animation::HAS_BOUNDING_BOX),
            speed: Some(1.5),
            bounding_box: Some(BoundingBox::default()),
            ..Animation::default()
        };
        let bytes = encode(&mut animation, 0x0110_5100).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 4 + 24 + 4);
        assert_eq!(decode::<Animation>(&bytes, 0x0110_5100), animation);
    }

    #[test]
    fn animation_flags_gate() {
        let mut animation = Animation {
            flags: Some(0),
            ..Animation::default()
        };
        let at = encode(&mut animation, 0x0110_4110).unwrap();
        let above = encode(&mut animation, 0x0110_4111).unwrap();
        assert_eq!(at.len(), 8);
        assert_eq!(above.len(), 12);
    }

    #[test]
    fn times_and_values_must_agree() {
        let mut layer = KeyframeLayer {
            times: vec![0.0],
            values: Keyframes::Position(Vec::new()),
        };
        assert!(matches!(
            encode(&mut layer, 0x0110_4030),
            Err(GfsError::Inconsistent { .. })
        ));
    }

    #[test]
    fn lookat_pack_roundtrip() {
        let blend = |duration: f32| Animation {
            flags: Some(0),
            duration,
            ..Animation::default()
        };
        let mut pack = AnimationPayload {
            flags: Some(AnimationPayload::HAS_LOOKAT),
            animations: vec![blend(1.0)],
            blend_animations: Vec::new(),
            lookat: Some(Box::new(LookAtAnimations {
                right: blend(1.0),
                right_factor: 0.5,
                left: blend(1.0),
                left_factor: 0.5,
                up: blend(2.0),
                up_factor: 0.25,
                down: blend(2.0),
                down_factor: 0.25,
            })),
        };
        let bytes = encode(&mut pack, 0x0110_4950).unwrap();
        assert_eq!(decode::<AnimationPayload>(&bytes, 0x0110_4950), pack);
    }
}
