//! Model trees, node attachments and whole-file round trips.

use gfs_pack::blob::RawBytes;
use gfs_pack::common::{BoundingBox, ObjectName, Property, PropertyValue};
use gfs_pack::materials::{Material, MaterialPayload, TextureRef, TextureSlot};
use gfs_pack::model::{
    Attachment, Camera, EmbeddedFile, Epl, EplHelper, EplLeaf, EplLeafBody, Falloff,
    IndexFormat, Light, LightKind, Mesh, ModelPayload, Morph, Node, Skin, Vertex,
};
use gfs_pack::{
    decode_container, encode_container, CodecOptions, Container, GfsCodec, GfsError, GfsFile,
    Payload,
};

const VERSION: u32 = 0x0110_4030;

fn named(name: &str) -> ObjectName {
    ObjectName::new(name, name.len() as u32 * 0x0101)
}

fn leaf(name: &str, attachment: Attachment) -> Node {
    Node {
        name: named(name),
        position: [1.0, 2.0, 3.0],
        attachment: Some(attachment),
        properties: None,
        ..Node::default()
    }
}

fn mesh() -> Mesh {
    let vertex = |x: f32| Vertex {
        position: Some([x, x, 0.0]),
        normal: Some([0.0, 0.0, 1.0]),
        ..Vertex::default()
    };
    Mesh {
        flags: Mesh::HAS_TRIANGLES | Mesh::HAS_BOUNDING_BOX,
        vertex_format: Vertex::POSITION | Vertex::NORMAL,
        index_format: Some(IndexFormat::U32),
        unknown_0x14: Some(0),
        vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0), vertex(3.0)],
        triangles: vec![[0, 1, 2], [2, 3, 0]],
        bounding_box: Some(BoundingBox {
            max: [3.0, 3.0, 0.0],
            min: [0.0; 3],
        }),
        ..Mesh::default()
    }
}

fn every_attachment() -> ModelPayload {
    let spot = Light {
        flags: Light::ALT_FALLOFF,
        ambient: [0.1; 4],
        diffuse: [1.0; 4],
        specular: [0.5; 4],
        kind: LightKind::Spot {
            falloff: Falloff::Range {
                start: 1.0,
                end: 20.0,
            },
            inner_angle: 0.3,
            outer_angle: 0.6,
        },
    };
    let helper = EplLeaf {
        flags: 1,
        name: named("smoke"),
        body: EplLeafBody::Helper(EplHelper {
            helper_type: 4,
            unknown_0x08: 0.25,
            embedded_file_1: Some(EmbeddedFile {
                name: named("smoke.ep"),
                data: vec![0x45, 0x50, 0x4C, 0x00],
            }),
            ..EplHelper::default()
        }),
        ..EplLeaf::default()
    };
    let opaque = EplLeaf {
        name: named("spark"),
        body: EplLeafBody::Opaque {
            kind: 3,
            bytes: RawBytes::new(vec![0xAB; 17]),
        },
        ..EplLeaf::default()
    };

    let mut body = leaf("body", Attachment::Mesh(mesh()));
    body.properties = Some(vec![
        Property {
            name: named("gfdHelperID"),
            value: PropertyValue::Int(42),
        },
        Property {
            name: named("label"),
            value: PropertyValue::String(b"torso".to_vec()),
        },
    ]);
    body.children = vec![
        leaf("fx", Attachment::Epl(Epl {
            flags: 0,
            size: 0,
            body: RawBytes::new(vec![1, 2, 3]),
        })),
        leaf("smoke", Attachment::EplLeaf(helper)),
        leaf("spark", Attachment::EplLeaf(opaque)),
    ];

    ModelPayload {
        flags: ModelPayload::HAS_SKIN | ModelPayload::HAS_BOUNDING_BOX,
        skin: Some(Skin {
            inverse_bind_matrices: vec![[0.5; 12]; 2],
            node_indices: vec![0, 1],
        }),
        bounding_box: Some(BoundingBox {
            max: [1.0; 3],
            min: [-1.0; 3],
        }),
        bounding_sphere: None,
        root: Node {
            name: named("RootNode"),
            properties: Some(vec![]),
            children: vec![
                body,
                leaf("camera", Attachment::Camera(Camera {
                    view: [0.0; 12],
                    near: 0.1,
                    far: 1000.0,
                    fov: 45.0,
                    aspect_ratio: 16.0 / 9.0,
                    unknown_0x190: None,
                })),
                leaf("lamp", Attachment::Light(spot)),
                leaf("face", Attachment::Morph(Morph {
                    initial_weights: vec![0.0, 1.0, 0.5],
                    mesh_name: named("face_mesh"),
                })),
            ],
            ..Node::default()
        },
    }
}

fn model_container(model: ModelPayload) -> Container {
    Container::new(VERSION, Payload::Model(Box::new(model)))
}

fn model_of(container: &Container) -> &ModelPayload {
    match &container.payload {
        Payload::Model(model) => model,
        other => panic!("expected model, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn every_attachment_roundtrips_in_one_tree() {
    let options = CodecOptions::default();
    let mut container = model_container(every_attachment());
    let (bytes, log) = encode_container(&mut container, &options).unwrap();
    assert!(log.is_empty());
    assert_eq!(container.size as usize, bytes.len());

    let (mut decoded, log) = decode_container(&bytes, &options).unwrap();
    assert!(log.is_empty());
    assert_eq!(decoded, container);
    assert_eq!(model_of(&decoded).node_count(), 8);

    let kinds: Vec<u32> = model_of(&decoded)
        .root
        .iter()
        .filter_map(|node| node.attachment.as_ref().map(Attachment::tag))
        .collect();
    assert_eq!(kinds, [4, 7, 8, 8, 5, 6, 9]);

    let (again, _) = encode_container(&mut decoded, &options).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn sub_block_sizes_are_backpatched() {
    let mut container = model_container(every_attachment());
    encode_container(&mut container, &CodecOptions::default()).unwrap();
    let body = &model_of(&container).root.children[0];
    match &body.children[0].attachment {
        Some(Attachment::Epl(epl)) => assert_eq!(epl.size, 3),
        other => panic!("expected effect, got {other:?}"),
    }
    match &body.children[2].attachment {
        Some(Attachment::EplLeaf(leaf)) => assert_eq!(leaf.size, 17),
        other => panic!("expected effect leaf, got {other:?}"),
    }
}

#[test]
fn skin_indices_outside_the_tree_are_logged() {
    let mut model = every_attachment();
    if let Some(skin) = &mut model.skin {
        skin.node_indices[1] = 40;
    }
    let mut codec = GfsCodec::default();
    let bytes = codec.encode_container(&mut model_container(model)).unwrap();
    assert_eq!(codec.log.warnings().count(), 1);
    assert!(!codec.log.has_errors());

    let mut codec = GfsCodec::default();
    codec.decode_container(&bytes).unwrap();
    assert_eq!(codec.log.warnings().count(), 1);
}

// ---------------------------------------------------------------------------
// Dispatch failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_attachment_tag_is_fatal() {
    let model = ModelPayload {
        root: leaf(
            "r",
            Attachment::Morph(Morph {
                initial_weights: vec![],
                mesh_name: named("m"),
            }),
        ),
        ..ModelPayload::default()
    };
    let (mut bytes, _) =
        encode_container(&mut model_container(model), &CodecOptions::default()).unwrap();
    // header, model flags, name, transform, attachment count
    let tag_at = 16 + 4 + (2 + 1 + 4) + 12 + 16 + 12 + 4;
    assert_eq!(&bytes[tag_at..tag_at + 4], &[0, 0, 0, 9]);
    bytes[tag_at + 3] = 10;
    assert!(matches!(
        decode_container(&bytes, &CodecOptions::default()),
        Err(GfsError::UnrecognizedAttachment { tag: 10, node: 0 })
    ));
}

#[test]
fn unknown_light_kind_is_fatal() {
    let mut light = Light::default();
    let mut codec = GfsCodec::default();
    let mut bytes = codec.encode_object(&mut light, VERSION).unwrap();
    bytes[7] = 3;
    assert!(matches!(
        codec.decode_object::<Light>(&bytes, VERSION),
        Err(GfsError::UnrecognizedVariant {
            what: "light type",
            value: 3
        })
    ));
}

#[test]
fn more_than_one_attachment_is_rejected() {
    let model = ModelPayload {
        root: Node {
            name: named("n"),
            ..Node::default()
        },
        ..ModelPayload::default()
    };
    let (mut bytes, _) =
        encode_container(&mut model_container(model), &CodecOptions::default()).unwrap();
    let count_at = 16 + 4 + (2 + 1 + 4) + 12 + 16 + 12;
    bytes[count_at + 3] = 2;
    assert!(matches!(
        decode_container(&bytes, &CodecOptions::default()),
        Err(GfsError::TooMany { count: 2, max: 1, .. })
    ));
}

// ---------------------------------------------------------------------------
// Version gates
// ---------------------------------------------------------------------------

#[test]
fn node_unknown_float_gate() {
    let mut root = Node {
        name: named("n"),
        unknown_float: Some(0.5),
        ..Node::default()
    };
    let mut codec = GfsCodec::default();
    let closed = codec.encode_object(&mut root, 0x0110_4700).unwrap();
    let open = codec.encode_object(&mut root, 0x0110_4701).unwrap();
    assert_eq!(open.len(), closed.len() + 4);

    let decoded: Node = codec.decode_object(&closed, 0x0110_4700).unwrap();
    assert_eq!(decoded.unknown_float, None);
    let decoded: Node = codec.decode_object(&open, 0x0110_4701).unwrap();
    assert_eq!(decoded.unknown_float, Some(0.5));

    root.unknown_float = None;
    assert!(matches!(
        codec.encode_object(&mut root, 0x0110_4701),
        Err(GfsError::MissingField {
            what: "node unknown float"
        })
    ));
}

#[test]
fn camera_unknown_0x190_gate() {
    let mut camera = Camera {
        unknown_0x190: Some(1.0),
        ..Camera::default()
    };
    let mut codec = GfsCodec::default();
    let closed = codec.encode_object(&mut camera, 0x0110_4060).unwrap();
    let open = codec.encode_object(&mut camera, 0x0110_4061).unwrap();
    assert_eq!(closed.len(), 48 + 16);
    assert_eq!(open.len(), 48 + 16 + 4);
}

#[test]
fn name_hash_gate() {
    let mut codec = GfsCodec::default();
    let mut name = named("abc");
    assert_eq!(codec.encode_object(&mut name, 0x0108_0010).unwrap().len(), 5);
    assert_eq!(codec.encode_object(&mut name, 0x0108_0011).unwrap().len(), 9);
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_roundtrip_with_magic() {
    let diffuse = TextureRef {
        name: named("body.dds"),
        unknown_0x04: 1,
        has_texture_filtering: 1,
        ..TextureRef::default()
    };
    let mut material = Material {
        name: named("body"),
        flags: TextureSlot::Diffuse.flag(),
        diffuse: [1.0; 4],
        ..Material::default()
    };
    material.textures[TextureSlot::Diffuse as usize] = Some(diffuse);

    let mut terminal = Container::new(VERSION, Payload::Terminal);
    terminal.size = 0;
    let mut closing = Container::new(VERSION, Payload::Empty);
    closing.size = 0x10;
    let mut file = GfsFile::new(vec![
        terminal,
        model_container(every_attachment()),
        Container::new(
            VERSION,
            Payload::Materials(MaterialPayload {
                materials: vec![material],
            }),
        ),
        closing,
    ]);

    let mut codec = GfsCodec::default();
    let bytes = codec.encode_file(&mut file).unwrap();
    assert_eq!(&bytes[..4], b"GFS0");

    let mut decoded = codec.decode_file(&bytes).unwrap();
    assert_eq!(decoded, file);
    assert_eq!(decoded.model().map(ModelPayload::node_count), Some(8));
    let materials = decoded.materials().unwrap();
    assert!(materials.materials[0].texture(TextureSlot::Diffuse).is_some());
    assert!(decoded.textures().is_none());
    assert_eq!(codec.encode_file(&mut decoded).unwrap(), bytes);
}
