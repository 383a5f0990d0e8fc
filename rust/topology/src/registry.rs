// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native shape identity → graph node maps.
//!
//! Non-edge shapes map one to one. Edges go through two maps, one per
//! orientation of use: the first use of an edge creates its curve and
//! records it under that orientation, and a later use with the opposite
//! orientation finds the curve through the other map and records it under
//! its own. Either way every use gets its own co-edge.
//!
//! Entries can outlive their nodes when the arena is edited directly;
//! an entry whose node is gone counts as a miss.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::arena::{Sense, TopologyArena};
use crate::keys::*;

/// Which map an entry went into.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Point,
    ForwardCurve,
    ReversedCurve,
    Loop,
    Face,
    Shell,
    Lump,
}

/// Per-session registry of already-built nodes, keyed by native identity.
#[derive(Debug, Clone)]
pub struct ShapeRegistry<K> {
    points: FxHashMap<K, PointKey>,
    forward_curves: FxHashMap<K, CurveKey>,
    reversed_curves: FxHashMap<K, CurveKey>,
    loops: FxHashMap<K, LoopKey>,
    faces: FxHashMap<K, FaceKey>,
    shells: FxHashMap<K, ShellKey>,
    lumps: FxHashMap<K, LumpKey>,
    /// Entries inserted since the last commit, oldest first.
    journal: Vec<(Slot, K)>,
}

impl<K> Default for ShapeRegistry<K> {
    fn default() -> Self {
        Self {
            points: FxHashMap::default(),
            forward_curves: FxHashMap::default(),
            reversed_curves: FxHashMap::default(),
            loops: FxHashMap::default(),
            faces: FxHashMap::default(),
            shells: FxHashMap::default(),
            lumps: FxHashMap::default(),
            journal: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ShapeRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&self, key: K) -> Option<PointKey> {
        self.points.get(&key).copied()
    }

    pub fn insert_point(&mut self, key: K, point: PointKey) {
        self.points.insert(key, point);
        self.journal.push((Slot::Point, key));
    }

    fn curve_slot(sense: Sense) -> Slot {
        match sense {
            Sense::Reversed => Slot::ReversedCurve,
            _ => Slot::ForwardCurve,
        }
    }

    fn curve_map(&self, sense: Sense) -> &FxHashMap<K, CurveKey> {
        match Self::curve_slot(sense) {
            Slot::ReversedCurve => &self.reversed_curves,
            _ => &self.forward_curves,
        }
    }

    /// Finds the curve of an edge used with `sense`.
    ///
    /// Looks in the map of that sense first, then in the opposite map; a
    /// hit there is recorded under `sense` as well. Curves no longer in
    /// `arena` do not count.
    pub fn resolve_curve(
        &mut self,
        key: K,
        sense: Sense,
        arena: &TopologyArena,
    ) -> Option<CurveKey> {
        let live = |curve: CurveKey| arena.curves.contains_key(curve);
        if let Some(&curve) = self.curve_map(sense).get(&key).filter(|c| live(**c)) {
            return Some(curve);
        }
        let curve = *self
            .curve_map(sense.reversed())
            .get(&key)
            .filter(|c| live(**c))?;
        self.insert_curve(key, sense, curve);
        Some(curve)
    }

    pub fn insert_curve(&mut self, key: K, sense: Sense, curve: CurveKey) {
        let slot = Self::curve_slot(sense);
        match slot {
            Slot::ReversedCurve => self.reversed_curves.insert(key, curve),
            _ => self.forward_curves.insert(key, curve),
        };
        self.journal.push((slot, key));
    }

    /// Curves recorded for an edge as `(forward, reversed)`.
    pub fn curve_entries(&self, key: K) -> (Option<CurveKey>, Option<CurveKey>) {
        (
            self.forward_curves.get(&key).copied(),
            self.reversed_curves.get(&key).copied(),
        )
    }

    pub fn loop_key(&self, key: K) -> Option<LoopKey> {
        self.loops.get(&key).copied()
    }

    pub fn insert_loop(&mut self, key: K, lp: LoopKey) {
        self.loops.insert(key, lp);
        self.journal.push((Slot::Loop, key));
    }

    pub fn face(&self, key: K) -> Option<FaceKey> {
        self.faces.get(&key).copied()
    }

    pub fn insert_face(&mut self, key: K, face: FaceKey) {
        self.faces.insert(key, face);
        self.journal.push((Slot::Face, key));
    }

    pub fn shell(&self, key: K) -> Option<ShellKey> {
        self.shells.get(&key).copied()
    }

    pub fn insert_shell(&mut self, key: K, shell: ShellKey) {
        self.shells.insert(key, shell);
        self.journal.push((Slot::Shell, key));
    }

    pub fn lump(&self, key: K) -> Option<LumpKey> {
        self.lumps.get(&key).copied()
    }

    pub fn insert_lump(&mut self, key: K, lump: LumpKey) {
        self.lumps.insert(key, lump);
        self.journal.push((Slot::Lump, key));
    }

    /// Keeps every entry inserted so far.
    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Drops every entry inserted since the last [`Self::commit`], newest
    /// first.
    pub(crate) fn rollback(&mut self) {
        while let Some((slot, key)) = self.journal.pop() {
            match slot {
                Slot::Point => {
                    self.points.remove(&key);
                }
                Slot::ForwardCurve => {
                    self.forward_curves.remove(&key);
                }
                Slot::ReversedCurve => {
                    self.reversed_curves.remove(&key);
                }
                Slot::Loop => {
                    self.loops.remove(&key);
                }
                Slot::Face => {
                    self.faces.remove(&key);
                }
                Slot::Shell => {
                    self.shells.remove(&key);
                }
                Slot::Lump => {
                    self.lumps.remove(&key);
                }
            }
        }
    }

    /// Total number of entries across all maps.
    pub fn len(&self) -> usize {
        self.points.len()
            + self.forward_curves.len()
            + self.reversed_curves.len()
            + self.loops.len()
            + self.faces.len()
            + self.shells.len()
            + self.lumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops entries whose node no longer exists in `arena`, e.g. after a
    /// body of the session was deleted.
    pub fn prune(&mut self, arena: &TopologyArena) {
        self.points.retain(|_, &mut k| arena.points.contains_key(k));
        self.forward_curves
            .retain(|_, &mut k| arena.curves.contains_key(k));
        self.reversed_curves
            .retain(|_, &mut k| arena.curves.contains_key(k));
        self.loops.retain(|_, &mut k| arena.loops.contains_key(k));
        self.faces.retain(|_, &mut k| arena.faces.contains_key(k));
        self.shells.retain(|_, &mut k| arena.shells.contains_key(k));
        self.lumps.retain(|_, &mut k| arena.lumps.contains_key(k));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_use_shares_curve() {
        let mut arena = TopologyArena::new();
        let p = arena.add_point(0.0, 0.0, 0.0);
        let curve = arena.add_curve(p, p).unwrap();

        let mut reg = ShapeRegistry::<u32>::new();
        assert_eq!(reg.resolve_curve(7, Sense::Forward, &arena), None);
        reg.insert_curve(7, Sense::Forward, curve);

        assert_eq!(reg.resolve_curve(7, Sense::Reversed, &arena), Some(curve));
        assert_eq!(reg.curve_entries(7), (Some(curve), Some(curve)));
        assert_eq!(reg.resolve_curve(7, Sense::Forward, &arena), Some(curve));
    }

    #[test]
    fn prune_drops_dead_entries() {
        let mut arena = TopologyArena::new();
        let a = arena.add_point(0.0, 0.0, 0.0);
        let b = arena.add_point(1.0, 0.0, 0.0);

        let mut reg = ShapeRegistry::<u32>::new();
        reg.insert_point(1, a);
        reg.insert_point(2, b);
        arena.points.remove(b);

        reg.prune(&arena);
        assert_eq!(reg.point(1), Some(a));
        assert_eq!(reg.point(2), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn dead_curve_is_a_miss() {
        let mut arena = TopologyArena::new();
        let p = arena.add_point(0.0, 0.0, 0.0);
        let curve = arena.add_curve(p, p).unwrap();

        let mut reg = ShapeRegistry::<u32>::new();
        reg.insert_curve(3, Sense::Reversed, curve);
        arena.curves.remove(curve);

        assert_eq!(reg.resolve_curve(3, Sense::Forward, &arena), None);
        assert_eq!(reg.resolve_curve(3, Sense::Reversed, &arena), None);
    }

    #[test]
    fn rollback_forgets_uncommitted_entries() {
        let mut arena = TopologyArena::new();
        let a = arena.add_point(0.0, 0.0, 0.0);
        let b = arena.add_point(1.0, 0.0, 0.0);
        let curve = arena.add_curve(a, b).unwrap();

        let mut reg = ShapeRegistry::<u32>::new();
        reg.insert_point(1, a);
        reg.commit();

        reg.insert_point(2, b);
        reg.insert_curve(5, Sense::Forward, curve);
        assert_eq!(reg.resolve_curve(5, Sense::Reversed, &arena), Some(curve));
        reg.rollback();

        assert_eq!(reg.point(1), Some(a));
        assert_eq!(reg.point(2), None);
        assert_eq!(reg.curve_entries(5), (None, None));
        assert_eq!(reg.len(), 1);
    }
}
