// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural queries: node counts, closed curves, orphan detection and the
//! consistency check run at the end of every import.

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;

/// Number of live nodes per kind, in table order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyCounts {
    pub points: usize,
    pub curves: usize,
    pub coedges: usize,
    pub loops: usize,
    pub faces: usize,
    pub shells: usize,
    pub lumps: usize,
    pub bodies: usize,
}

impl TopologyCounts {
    /// Returns the count for one node kind.
    pub fn get(&self, ty: TopologyType) -> usize {
        match ty {
            TopologyType::Point => self.points,
            TopologyType::Curve => self.curves,
            TopologyType::CoEdge => self.coedges,
            TopologyType::Loop => self.loops,
            TopologyType::Face => self.faces,
            TopologyType::Shell => self.shells,
            TopologyType::Lump => self.lumps,
            TopologyType::Body => self.bodies,
        }
    }

    /// Total number of nodes.
    pub fn total(&self) -> usize {
        TopologyType::ALL.iter().map(|&t| self.get(t)).sum()
    }
}

impl TopologyArena {
    /// Returns the number of live nodes of every kind.
    pub fn counts(&self) -> TopologyCounts {
        TopologyCounts {
            points: self.points.len(),
            curves: self.curves.len(),
            coedges: self.coedges.len(),
            loops: self.loops.len(),
            faces: self.faces.len(),
            shells: self.shells.len(),
            lumps: self.lumps.len(),
            bodies: self.bodies.len(),
        }
    }

    /// Returns `true` when both endpoints of a curve are the same point.
    pub fn is_closed_curve(&self, key: CurveKey) -> bool {
        self.curves.get(key).is_some_and(|c| c.start == c.end)
    }

    /// Returns `true` if a node has at least one parent. Bodies are roots and
    /// always count as parented.
    pub fn has_parent(&self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Point(k) => self.point_to_curves.get(&k).is_some_and(|s| !s.is_empty()),
            TopologyKey::Curve(k) => self.curve_to_coedges.get(&k).is_some_and(|s| !s.is_empty()),
            TopologyKey::CoEdge(k) => self.coedge_to_loop.contains_key(&k),
            TopologyKey::Loop(k) => self.loop_to_faces.get(&k).is_some_and(|s| !s.is_empty()),
            TopologyKey::Face(k) => self.face_to_shells.get(&k).is_some_and(|s| !s.is_empty()),
            TopologyKey::Shell(k) => self.shell_to_lumps.get(&k).is_some_and(|s| !s.is_empty()),
            TopologyKey::Lump(k) => self.lumps.get(k).is_some_and(|l| l.body.is_some()),
            TopologyKey::Body(_) => true,
        }
    }

    /// Returns every non-body node without a parent, leaves first.
    pub fn orphans(&self) -> Vec<TopologyKey> {
        let mut out = Vec::new();
        let candidates = self
            .points
            .keys()
            .map(TopologyKey::from)
            .chain(self.curves.keys().map(TopologyKey::from))
            .chain(self.coedges.keys().map(TopologyKey::from))
            .chain(self.loops.keys().map(TopologyKey::from))
            .chain(self.faces.keys().map(TopologyKey::from))
            .chain(self.shells.keys().map(TopologyKey::from))
            .chain(self.lumps.keys().map(TopologyKey::from));
        for key in candidates {
            if !self.has_parent(key) {
                out.push(key);
            }
        }
        out
    }

    /// Verifies the structural invariants of a completed graph.
    ///
    /// Fails with a malformed-input error on the first empty container or
    /// orphaned node.
    pub fn check(&self) -> Result<()> {
        if self.loops.values().any(|l| l.coedges.is_empty()) {
            return Err(Error::EmptyLoop);
        }
        if self.faces.values().any(|f| f.loops.is_empty()) {
            return Err(Error::FaceWithoutLoops);
        }
        if self.shells.values().any(|s| s.faces.is_empty()) {
            return Err(Error::EmptyShell);
        }
        if self.lumps.values().any(|l| l.shells.is_empty()) {
            return Err(Error::EmptyLump);
        }
        if let Some(orphan) = self.orphans().first() {
            return Err(Error::malformed(
                orphan.topology_type(),
                format!("{orphan:?} has no parent"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_polygon_face;
    use crate::error::ErrorCategory;

    fn triangle_body(arena: &mut TopologyArena) -> BodyKey {
        let pts = [
            arena.add_point(0.0, 0.0, 0.0),
            arena.add_point(1.0, 0.0, 0.0),
            arena.add_point(0.0, 1.0, 0.0),
        ];
        let (face, _, _) = make_polygon_face(arena, &pts).unwrap();
        let shell = arena.add_shell(&[face]).unwrap();
        let lump = arena.add_lump(&[shell]).unwrap();
        arena.add_body(&[lump]).unwrap()
    }

    #[test]
    fn counts_of_triangle_body() {
        let mut arena = TopologyArena::new();
        triangle_body(&mut arena);
        let counts = arena.counts();

        assert_eq!(counts.points, 3);
        assert_eq!(counts.curves, 3);
        assert_eq!(counts.coedges, 3);
        assert_eq!(counts.loops, 1);
        assert_eq!(counts.faces, 1);
        assert_eq!(counts.shells, 1);
        assert_eq!(counts.lumps, 1);
        assert_eq!(counts.bodies, 1);
        assert_eq!(counts.total(), 14);
        assert_eq!(counts.get(TopologyType::Curve), 3);
    }

    #[test]
    fn complete_body_passes_check() {
        let mut arena = TopologyArena::new();
        triangle_body(&mut arena);
        assert!(arena.orphans().is_empty());
        arena.check().unwrap();
    }

    #[test]
    fn stray_point_is_orphan() {
        let mut arena = TopologyArena::new();
        triangle_body(&mut arena);
        let stray = arena.add_point(5.0, 5.0, 5.0);

        assert_eq!(arena.orphans(), vec![TopologyKey::Point(stray)]);
        let err = arena.check().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
    }

    #[test]
    fn unowned_lump_is_orphan() {
        let mut arena = TopologyArena::new();
        let pts = [
            arena.add_point(0.0, 0.0, 0.0),
            arena.add_point(1.0, 0.0, 0.0),
            arena.add_point(0.0, 1.0, 0.0),
        ];
        let (face, _, _) = make_polygon_face(&mut arena, &pts).unwrap();
        let shell = arena.add_shell(&[face]).unwrap();
        let lump = arena.add_lump(&[shell]).unwrap();

        assert_eq!(arena.orphans(), vec![TopologyKey::Lump(lump)]);
    }

    #[test]
    fn empty_container_fails_check() {
        let mut arena = TopologyArena::new();
        arena.new_face(crate::arena::Sense::Forward, crate::arena::Sense::Forward);
        assert!(matches!(arena.check(), Err(Error::FaceWithoutLoops)));
    }

    #[test]
    fn closed_curve_detection() {
        let mut arena = TopologyArena::new();
        let p = arena.add_point(0.0, 0.0, 0.0);
        let q = arena.add_point(1.0, 0.0, 0.0);
        let closed = arena.add_curve(p, p).unwrap();
        let open = arena.add_curve(p, q).unwrap();

        assert!(arena.is_closed_curve(closed));
        assert!(!arena.is_closed_curve(open));
    }
}
