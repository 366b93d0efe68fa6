mod common;

use common::*;
use studiomodel::vvd::Vvd;
use studiomodel::{decode_model, JointKind, ModelBuffers, ModelError};

const CHECKSUM: i32 = 77;

fn empty_siblings() -> (Vec<u8>, Vec<u8>) {
    (build_vvd(CHECKSUM, &[], &[]), build_vtx_parts(CHECKSUM, &[]))
}

fn minimal_mdl() -> Vec<u8> {
    let mut mdl = TestMdl::new(CHECKSUM);
    mdl.bones.push(TestBone::root("root"));
    mdl.build()
}

#[test]
fn fixup_covering_everything_is_equivalent_to_no_fixups() {
    let vertices: Vec<TestVertex> = (0..6)
        .map(|index| TestVertex::at([index as f32, 0.0, 0.0]))
        .collect();
    let plain = build_vvd(CHECKSUM, &vertices, &[]);
    let fixed_up = build_vvd(CHECKSUM, &vertices, &[(0, 0, vertices.len() as i32)]);

    let plain = Vvd::read(&plain, 0).unwrap();
    let fixed_up = Vvd::read(&fixed_up, 0).unwrap();

    assert_eq!(plain.vertices.len(), fixed_up.vertices.len());
    for (a, b) in plain.vertices.iter().zip(&fixed_up.vertices) {
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn fixups_below_the_root_lod_are_skipped() {
    let vertices: Vec<TestVertex> = (0..4)
        .map(|index| TestVertex::at([index as f32, 0.0, 0.0]))
        .collect();
    let data = build_vvd(CHECKSUM, &vertices, &[(0, 0, 2), (1, 2, 2)]);

    let vvd = Vvd::read(&data, 1).unwrap();
    assert_eq!(vvd.vertices.len(), 2);
    assert_eq!(<[f32; 3]>::from(vvd.vertices[0].position), [2.0, 0.0, 0.0]);
    assert_eq!(<[f32; 3]>::from(vvd.vertices[1].position), [3.0, 0.0, 0.0]);
}

#[test]
fn missing_vvd_magic_is_a_missing_sibling() {
    let mut data = build_vvd(CHECKSUM, &[], &[]);
    data[0..4].copy_from_slice(b"XXXX");
    assert!(matches!(
        Vvd::read(&data, 0),
        Err(ModelError::MissingSibling { file: "vvd" })
    ));
}

#[test]
fn wide_limits_classify_as_ball_joint() {
    let mdl = minimal_mdl();
    let (vvd, vtx) = empty_siblings();
    let phy = build_phy(
        &[solid_blob(&tetrahedron()), solid_blob(&tetrahedron())],
        r#"
            solid { index 0 name "a" mass 2 }
            solid { index 1 name "b" mass 3 }
            ragdollconstraint { parent 0 child 1 xmin -10 xmax 10 ymin -20 ymax 20 zmin -25 zmax 25 }
        "#,
    );

    let model = decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: None,
            phy: Some(&phy),
        },
        "models/ball.mdl",
        &(),
        &mut (),
    )
    .unwrap();

    assert_eq!(
        model.joints[0].kind,
        JointKind::Ball {
            swing_limit: 25.0,
            twist_min: -10.0,
            twist_max: 10.0
        }
    );
}

#[test]
fn locked_limits_classify_as_fixed_joint() {
    let mdl = minimal_mdl();
    let (vvd, vtx) = empty_siblings();
    let phy = build_phy(
        &[solid_blob(&tetrahedron()), solid_blob(&tetrahedron())],
        r#"
            solid { index 0 name "a" mass 1 }
            solid { index 1 name "b" mass 1 }
            ragdollconstraint { parent 0 child 1 xmin -2 xmax 2 ymin 0 ymax 0 zmin -1 zmax 1 }
        "#,
    );

    let model = decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: None,
            phy: Some(&phy),
        },
        "models/fixed.mdl",
        &(),
        &mut (),
    )
    .unwrap();

    assert_eq!(model.joints[0].kind, JointKind::Fixed);
}

#[test]
fn degenerate_solids_produce_no_body_and_break_their_constraints() {
    let mdl = minimal_mdl();
    let (vvd, vtx) = empty_siblings();
    // four distinct but coplanar points, no extent along one source axis
    let flat = vec![
        [0.0, 0.0, 0.0],
        [0.1, 0.0, 0.0],
        [0.0, 0.1, 0.0],
        [0.05, 0.05, 0.0],
    ];
    let phy = build_phy(
        &[solid_blob(&tetrahedron()), solid_blob(&flat)],
        r#"
            solid { index 0 name "a" mass 1 }
            solid { index 1 name "b" mass 1 }
            ragdollconstraint { parent 0 child 1 xmin -30 xmax 30 ymin 0 ymax 0 zmin 0 zmax 0 }
        "#,
    );

    let model = decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: None,
            phy: Some(&phy),
        },
        "models/degenerate.mdl",
        &(),
        &mut (),
    )
    .unwrap();

    assert_eq!(model.bodies.len(), 1);
    assert!(model.joints.is_empty());
}

#[test]
fn triangle_strip_quad() {
    let mut mdl = TestMdl::new(CHECKSUM);
    mdl.bones.push(TestBone::root("root"));
    mdl.body_parts.push(TestBodyPart {
        name: "body",
        models: vec![TestModel {
            vertex_index: 0,
            meshes: vec![TestMesh {
                material: 0,
                vertex_offset: 0,
            }],
        }],
    });
    let mdl = mdl.build();

    let vertices: Vec<TestVertex> = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ]
    .into_iter()
    .map(TestVertex::at)
    .collect();
    let vvd = build_vvd(CHECKSUM, &vertices, &[]);
    // 4 strip indices make indexCount - 2 = 2 triangles
    let vtx = build_vtx(CHECKSUM, &[0, 1, 2, 3], &[0, 1, 2, 3], STRIP_IS_TRI_STRIP);

    let model = decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: None,
            phy: None,
        },
        "models/strip.mdl",
        &(),
        &mut (),
    )
    .unwrap();

    let mesh = &model.meshes[0];
    assert_eq!(mesh.indices.len(), 6);
    assert_eq!(mesh.vertices.len(), 4);
}

#[test]
fn degenerate_triangles_are_filtered() {
    let mut mdl = TestMdl::new(CHECKSUM);
    mdl.bones.push(TestBone::root("root"));
    mdl.body_parts.push(TestBodyPart {
        name: "body",
        models: vec![TestModel {
            vertex_index: 0,
            meshes: vec![TestMesh {
                material: 0,
                vertex_offset: 0,
            }],
        }],
    });
    let mdl = mdl.build();

    let vertices: Vec<TestVertex> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        .into_iter()
        .map(TestVertex::at)
        .collect();
    let vvd = build_vvd(CHECKSUM, &vertices, &[]);
    // second triangle repeats a corner and must be dropped
    let vtx = build_vtx(CHECKSUM, &[0, 1, 2], &[0, 1, 2, 0, 0, 1], STRIP_IS_TRI_LIST);

    let model = decode_model(
        ModelBuffers {
            mdl: &mdl,
            vvd: &vvd,
            vtx: &vtx,
            ani: None,
            phy: None,
        },
        "models/degenerate-tris.mdl",
        &(),
        &mut (),
    )
    .unwrap();

    assert_eq!(model.meshes[0].indices.len(), 3);
}
