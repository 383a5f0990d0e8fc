// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export → import round trips through memory and through files.

use approx::assert_relative_eq;
use brep_lite_topology::{
    AttributeRecord, ByteOrder, CodecConfig, Error, ErrorCategory, ImportSession, ShapeTree,
    TopologyArena, TopologyKey, TopologyTables,
};
use nalgebra::Vector3;

fn imported_cube() -> TopologyArena {
    let mut tree = ShapeTree::new();
    let v: Vec<_> = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ]
    .iter()
    .map(|p| tree.vertex(p[0], p[1], p[2]))
    .collect();

    // Bottom ring, top ring, verticals.
    let b: Vec<_> = (0..4).map(|i| tree.edge(v[i], v[(i + 1) % 4])).collect();
    let t: Vec<_> = (0..4).map(|i| tree.edge(v[4 + i], v[4 + (i + 1) % 4])).collect();
    let u: Vec<_> = (0..4).map(|i| tree.edge(v[i], v[4 + i])).collect();

    let mut wires = vec![
        tree.wire(&[b[3].reversed(), b[2].reversed(), b[1].reversed(), b[0].reversed()]),
        tree.wire(&[t[0], t[1], t[2], t[3]]),
    ];
    for i in 0..4 {
        let j = (i + 1) % 4;
        wires.push(tree.wire(&[b[i], u[j], t[i].reversed(), u[i].reversed()]));
    }
    let faces: Vec<_> = wires.iter().map(|w| tree.face(&[*w])).collect();
    let shell = tree.shell(&faces);
    let solid = tree.solid(&[shell]);

    let mut session = ImportSession::new(&tree);
    session.import_body(&solid).unwrap();
    session.finish().unwrap()
}

fn roundtrip(arena: &TopologyArena, config: &CodecConfig) -> TopologyArena {
    let mut bytes = Vec::new();
    arena.export_to(&mut bytes, config).unwrap();
    TopologyArena::import_from(bytes.as_slice(), config).unwrap()
}

#[test]
fn cube_survives_roundtrip() {
    let mut arena = imported_cube();
    let counts = arena.counts();
    assert_eq!(counts.points, 8);
    assert_eq!(counts.curves, 12);
    assert_eq!(counts.coedges, 24);
    assert_eq!(counts.faces, 6);

    let body = arena.body_keys()[0];
    arena.rotate(body, &Vector3::new(1.0, 1.0, 0.0), 0.7).unwrap();
    arena.scale(body, 2.5).unwrap();
    let (face, _) = arena.faces().next().unwrap();
    arena
        .attach(
            TopologyKey::Face(face),
            AttributeRecord::new("SURFACE_ID").with_string("plane").with_int(3),
        )
        .unwrap();

    for order in [ByteOrder::Little, ByteOrder::Big] {
        let config = CodecConfig::default().with_byte_order(order);
        let back = roundtrip(&arena, &config);

        assert_eq!(
            TopologyTables::from_arena(&back).unwrap(),
            TopologyTables::from_arena(&arena).unwrap()
        );
        let rb = back.body_keys()[0];
        assert_eq!(back.body_transform(rb), arena.body_transform(body));
        assert!(back.check().is_ok());
    }
}

#[test]
fn world_bounds_follow_transform_after_reload() {
    let mut arena = imported_cube();
    let body = arena.body_keys()[0];
    arena.translate(body, 10.0, 0.0, -2.0).unwrap();

    let mut back = roundtrip(&arena, &CodecConfig::default());
    let rb = back.body_keys()[0];
    let bbox = back.bounding_box(rb).unwrap();
    assert_relative_eq!(bbox.min.x, 10.0);
    assert_relative_eq!(bbox.max.x, 11.0);
    assert_relative_eq!(bbox.min.z, -2.0);
    assert_relative_eq!(bbox.max.z, -1.0);
}

#[test]
fn translation_and_tolerance_are_bit_exact() {
    let mut arena = imported_cube();
    let body = arena.body_keys()[0];
    arena.translate(body, 1.0, 0.0, 0.0).unwrap();
    arena
        .attach(
            TopologyKey::Body(body),
            AttributeRecord::new("ENTITY_TOL").with_double(0.001),
        )
        .unwrap();

    let back = roundtrip(&arena, &CodecConfig::default());
    let rb = back.body_keys()[0];
    let before = arena.body_transform(body).unwrap();
    let after = back.body_transform(rb).unwrap();
    assert!(before
        .iter()
        .zip(after.iter())
        .all(|(a, b)| a.to_bits() == b.to_bits()));
    assert_eq!(after[(0, 3)], 1.0);

    let tol = back.query(TopologyKey::Body(rb), Some("ENTITY_TOL"));
    assert_eq!(tol.len(), 1);
    assert_eq!(tol[0].doubles[0].to_bits(), 0.001f64.to_bits());
}

#[test]
fn version_99_returns_no_graph() {
    let arena = imported_cube();
    let config = CodecConfig::default().with_byte_order(ByteOrder::Big);
    let mut bytes = Vec::new();
    arena.export_to(&mut bytes, &config).unwrap();
    bytes[17..21].copy_from_slice(&99u32.to_be_bytes());

    let result = TopologyArena::import_from(bytes.as_slice(), &config);
    match result {
        Err(err @ Error::VersionMismatch { found: 99, .. }) => {
            assert_eq!(err.category(), ErrorCategory::VersionMismatch);
        }
        other => panic!("expected a version mismatch, got {other:?}"),
    }
}

#[test]
fn file_roundtrip_through_temp_dir() {
    let arena = imported_cube();
    let path = std::env::temp_dir().join(format!(
        "brep-lite-topology-{}-cube.brep",
        std::process::id()
    ));

    let counts = arena.export_to_path(&path, &CodecConfig::default()).unwrap();
    let back = TopologyArena::import_from_path(&path, &CodecConfig::default()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(back.counts(), counts);
    assert_eq!(
        TopologyTables::from_arena(&back).unwrap(),
        TopologyTables::from_arena(&arena).unwrap()
    );
}

#[test]
fn unwritable_path_is_resource_error() {
    let arena = imported_cube();
    let path = std::env::temp_dir()
        .join("brep-lite-topology-no-such-dir")
        .join("out.brep");
    let err = arena
        .export_to_path(&path, &CodecConfig::default())
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resource);
}

#[test]
fn json_and_binary_agree() {
    let arena = imported_cube();
    let from_json = TopologyArena::from_json(&arena.to_json().unwrap()).unwrap();
    let from_binary = roundtrip(&arena, &CodecConfig::default());
    assert_eq!(
        TopologyTables::from_arena(&from_json).unwrap(),
        TopologyTables::from_arena(&from_binary).unwrap()
    );
}
