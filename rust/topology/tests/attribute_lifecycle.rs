// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed attribute lifecycle across merges, splits and file round trips.

use brep_lite_topology::{
    AttributeKind, CodecConfig, EntityName, EntityTolerance, LifecycleState, TopologyArena,
    TopologyKey, TypedAttribute,
};

type Tolerance = TypedAttribute<EntityTolerance>;

fn two_points(arena: &mut TopologyArena) -> (TopologyKey, TopologyKey) {
    (
        TopologyKey::Point(arena.add_point(0.0, 0.0, 0.0)),
        TopologyKey::Point(arena.add_point(1.0, 0.0, 0.0)),
    )
}

fn reload(arena: &TopologyArena) -> TopologyArena {
    let mut bytes = Vec::new();
    arena.export_to(&mut bytes, &CodecConfig::default()).unwrap();
    TopologyArena::import_from(bytes.as_slice(), &CodecConfig::default()).unwrap()
}

#[test]
fn merge_keeps_smaller_tolerance() {
    let mut arena = TopologyArena::new();
    let (a, b) = two_points(&mut arena);
    arena.set_local_tolerance(a, 0.01).unwrap();
    arena.set_local_tolerance(b, 0.02).unwrap();

    let mut survivor = Tolerance::construct(&arena, a, None).unwrap();
    let loser = Tolerance::construct(&arena, b, None).unwrap();
    survivor.merge_owner(&mut arena, loser).unwrap();

    assert_eq!(*survivor.value(), 0.01);
    assert_eq!(arena.local_tolerance(a), 0.01);

    survivor.update(&mut arena).unwrap();
    let records = arena.query(a, Some(EntityTolerance::NAME));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].doubles, vec![0.01]);
}

#[test]
fn merge_with_unset_takes_the_other_value() {
    let mut arena = TopologyArena::new();
    let (a, b) = two_points(&mut arena);
    arena.set_local_tolerance(b, 0.02).unwrap();

    let mut survivor = Tolerance::construct(&arena, a, None).unwrap();
    let loser = Tolerance::construct(&arena, b, None).unwrap();
    survivor.merge_owner(&mut arena, loser).unwrap();
    assert_eq!(arena.local_tolerance(a), 0.02);
}

#[test]
fn default_value_is_never_persisted() {
    let mut arena = TopologyArena::new();
    let (a, _) = two_points(&mut arena);

    let mut attr = Tolerance::construct(&arena, a, None).unwrap();
    attr.actuate(&mut arena).unwrap();
    attr.update(&mut arena).unwrap();
    assert!(attr.is_pending_delete());
    assert!(arena.query(a, None).is_empty());

    let mut back = reload(&arena);
    let total: usize = back
        .points()
        .map(|(k, _)| back.attributes_of(TopologyKey::Point(k)).len())
        .sum();
    assert_eq!(total, 0);
    assert_eq!(Tolerance::restore_all(&mut back).unwrap(), 0);
}

#[test]
fn lifecycle_operations_are_idempotent() {
    let mut arena = TopologyArena::new();
    let (a, _) = two_points(&mut arena);
    let record = EntityTolerance::encode(&0.25);

    let mut attr = Tolerance::construct(&arena, a, Some(&record)).unwrap();
    attr.actuate(&mut arena).unwrap();
    let once = arena.local_tolerance(a);
    attr.actuate(&mut arena).unwrap();
    assert_eq!(arena.local_tolerance(a), once);

    attr.update(&mut arena).unwrap();
    attr.update(&mut arena).unwrap();
    assert_eq!(arena.query(a, Some(EntityTolerance::NAME)).len(), 1);

    // A dirty cycle refreshes the record instead of duplicating it.
    arena.set_local_tolerance(a, 0.5).unwrap();
    attr.mark_dirty();
    attr.update(&mut arena).unwrap();
    let records = arena.query(a, Some(EntityTolerance::NAME));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].doubles, vec![0.5]);
    assert_eq!(attr.state(), LifecycleState::Updated);
}

#[test]
fn actuate_never_overwrites_live_value() {
    let mut arena = TopologyArena::new();
    let (a, _) = two_points(&mut arena);
    arena.set_local_tolerance(a, 0.3).unwrap();

    let record = EntityTolerance::encode(&0.9);
    let mut attr = Tolerance::construct(&arena, a, Some(&record)).unwrap();
    attr.actuate(&mut arena).unwrap();
    assert_eq!(arena.local_tolerance(a), 0.3);
}

#[test]
fn split_duplicates_into_new_owner() {
    let mut arena = TopologyArena::new();
    let (a, b) = two_points(&mut arena);
    arena.set_entity_name(a, "rim").unwrap();

    let mut original = TypedAttribute::<EntityName>::construct(&arena, a, None).unwrap();
    let copy = original.split_owner(&mut arena).unwrap().unwrap();
    arena.attach(b, copy).unwrap();

    let mut twin = TypedAttribute::<EntityName>::construct(
        &arena,
        b,
        arena.query(b, Some(EntityName::NAME)).first().copied(),
    )
    .unwrap();
    twin.actuate(&mut arena).unwrap();

    assert_eq!(arena.entity_name(a), "rim");
    assert_eq!(arena.entity_name(b), "rim");
    assert_eq!(arena.query(a, Some(EntityName::NAME)).len(), 1);
}

#[test]
fn records_restore_live_state_after_reload() {
    let mut arena = TopologyArena::new();
    let (a, b) = two_points(&mut arena);
    arena.set_local_tolerance(a, 0.004).unwrap();
    let mut attr = Tolerance::construct(&arena, a, None).unwrap();
    attr.update(&mut arena).unwrap();
    arena.set_local_tolerance(b, 0.7).unwrap();

    let mut back = reload(&arena);
    // Live state is not part of the file; only records are.
    let restored = Tolerance::restore_all(&mut back).unwrap();
    assert_eq!(restored, 1);

    let tolerances: Vec<f64> = back
        .points()
        .map(|(k, _)| back.local_tolerance(TopologyKey::Point(k)))
        .collect();
    assert_eq!(tolerances, vec![0.004, 0.0]);
}

#[test]
fn missing_owner_fails() {
    let mut arena = TopologyArena::new();
    let p = arena.add_point(0.0, 0.0, 0.0);
    let q = arena.add_point(1.0, 0.0, 0.0);
    let curve = arena.add_curve(p, q).unwrap();
    let owner = TopologyKey::Curve(curve);
    arena.set_local_tolerance(owner, 0.1).unwrap();

    let mut attr = Tolerance::construct(&arena, owner, None).unwrap();
    let mut fresh = TopologyArena::new();
    let err = attr.update(&mut fresh).unwrap_err();
    assert_eq!(err.category(), brep_lite_topology::ErrorCategory::Usage);

    attr.unbind();
    assert_eq!(attr.state(), LifecycleState::Unbound);
    assert!(attr.actuate(&mut arena).is_err());
}
