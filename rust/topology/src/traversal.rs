// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal methods for navigating the topology hierarchy.
//!
//! Supports both downward traversal (body → lumps → … → points) and upward
//! traversal (point → curves → … → body) via the adjacency index. The
//! generic [`TopologyArena::children`] and [`TopologyArena::parents`] match
//! exhaustively over the eight node kinds.

use rustc_hash::FxHashSet;

use crate::arena::{Sense, TopologyArena};
use crate::keys::*;

// =============================================================================
// Generic one-level traversal
// =============================================================================

impl TopologyArena {
    /// Returns the direct children of a node, in stored order.
    ///
    /// A closed curve reports its single point once. Unknown keys yield an
    /// empty list.
    pub fn children(&self, key: TopologyKey) -> Vec<TopologyKey> {
        match key {
            TopologyKey::Point(_) => Vec::new(),
            TopologyKey::Curve(k) => match self.curves.get(k) {
                Some(c) if c.start == c.end => vec![c.start.into()],
                Some(c) => vec![c.start.into(), c.end.into()],
                None => Vec::new(),
            },
            TopologyKey::CoEdge(k) => self
                .coedges
                .get(k)
                .map(|c| vec![c.curve.into()])
                .unwrap_or_default(),
            TopologyKey::Loop(k) => self
                .loops
                .get(k)
                .map(|l| l.coedges.iter().map(|&c| c.into()).collect())
                .unwrap_or_default(),
            TopologyKey::Face(k) => self
                .faces
                .get(k)
                .map(|f| f.loops.iter().map(|&l| l.into()).collect())
                .unwrap_or_default(),
            TopologyKey::Shell(k) => self
                .shells
                .get(k)
                .map(|s| s.faces.iter().map(|&f| f.into()).collect())
                .unwrap_or_default(),
            TopologyKey::Lump(k) => self
                .lumps
                .get(k)
                .map(|l| l.shells.iter().map(|&s| s.into()).collect())
                .unwrap_or_default(),
            TopologyKey::Body(k) => self
                .bodies
                .get(k)
                .map(|b| b.lumps.iter().map(|&l| l.into()).collect())
                .unwrap_or_default(),
        }
    }

    /// Returns the direct parents of a node. A lump reports its owning body.
    pub fn parents(&self, key: TopologyKey) -> Vec<TopologyKey> {
        match key {
            TopologyKey::Point(k) => collect_set(self.point_to_curves.get(&k)),
            TopologyKey::Curve(k) => collect_set(self.curve_to_coedges.get(&k)),
            TopologyKey::CoEdge(k) => self
                .coedge_to_loop
                .get(&k)
                .map(|&l| vec![l.into()])
                .unwrap_or_default(),
            TopologyKey::Loop(k) => collect_set(self.loop_to_faces.get(&k)),
            TopologyKey::Face(k) => collect_set(self.face_to_shells.get(&k)),
            TopologyKey::Shell(k) => collect_set(self.shell_to_lumps.get(&k)),
            TopologyKey::Lump(k) => self
                .lumps
                .get(k)
                .and_then(|l| l.body)
                .map(|b| vec![b.into()])
                .unwrap_or_default(),
            TopologyKey::Body(_) => Vec::new(),
        }
    }
}

fn collect_set<K: Copy + Into<TopologyKey>>(set: Option<&FxHashSet<K>>) -> Vec<TopologyKey> {
    set.map(|s| s.iter().map(|&k| k.into()).collect())
        .unwrap_or_default()
}

// =============================================================================
// Downward traversal: typed accessors
// =============================================================================

impl TopologyArena {
    /// Returns the start and end point of a curve.
    pub fn curve_points(&self, key: CurveKey) -> Option<(PointKey, PointKey)> {
        self.curves.get(key).map(|c| (c.start, c.end))
    }

    /// Returns the curve a co-edge uses.
    pub fn coedge_curve(&self, key: CoEdgeKey) -> Option<CurveKey> {
        self.coedges.get(key).map(|c| c.curve)
    }

    /// Returns the co-edges of a loop in cyclic order.
    pub fn loop_coedges(&self, key: LoopKey) -> Option<&[CoEdgeKey]> {
        self.loops.get(key).map(|l| l.coedges.as_slice())
    }

    /// Returns the points of a loop in traversal order, honouring each
    /// co-edge's sense.
    pub fn loop_points_ordered(&self, key: LoopKey) -> Option<Vec<PointKey>> {
        let lp = self.loops.get(key)?;
        let mut points = Vec::with_capacity(lp.coedges.len());
        for &ck in &lp.coedges {
            let coedge = self.coedges.get(ck)?;
            let curve = self.curves.get(coedge.curve)?;
            let start = match coedge.sense {
                Sense::Reversed => curve.end,
                _ => curve.start,
            };
            points.push(start);
        }
        Some(points)
    }

    /// Returns the loops of a face; the first is the outer boundary.
    pub fn face_loops(&self, key: FaceKey) -> Option<&[LoopKey]> {
        self.faces.get(key).map(|f| f.loops.as_slice())
    }

    /// Returns the faces of a shell.
    pub fn shell_faces(&self, key: ShellKey) -> Option<&[FaceKey]> {
        self.shells.get(key).map(|s| s.faces.as_slice())
    }

    /// Returns the shells of a lump; the first is the outer shell.
    pub fn lump_shells(&self, key: LumpKey) -> Option<&[ShellKey]> {
        self.lumps.get(key).map(|l| l.shells.as_slice())
    }

    /// Returns the lumps of a body.
    pub fn body_lumps(&self, key: BodyKey) -> Option<&[LumpKey]> {
        self.bodies.get(key).map(|b| b.lumps.as_slice())
    }

    /// Returns all unique curves used by a face.
    pub fn face_curves(&self, key: FaceKey) -> Option<FxHashSet<CurveKey>> {
        let face = self.faces.get(key)?;
        let mut set = FxHashSet::default();
        for &lk in &face.loops {
            if let Some(lp) = self.loops.get(lk) {
                set.extend(
                    lp.coedges
                        .iter()
                        .filter_map(|&ck| self.coedges.get(ck).map(|c| c.curve)),
                );
            }
        }
        Some(set)
    }

    /// Returns all unique points used by a face.
    pub fn face_points(&self, key: FaceKey) -> Option<FxHashSet<PointKey>> {
        let curves = self.face_curves(key)?;
        let mut set = FxHashSet::default();
        for ck in curves {
            if let Some(c) = self.curves.get(ck) {
                set.insert(c.start);
                set.insert(c.end);
            }
        }
        Some(set)
    }

    /// Returns all unique faces reachable from a body.
    pub fn body_faces(&self, key: BodyKey) -> Option<FxHashSet<FaceKey>> {
        let body = self.bodies.get(key)?;
        let mut set = FxHashSet::default();
        for &lk in &body.lumps {
            let Some(lump) = self.lumps.get(lk) else {
                continue;
            };
            for &sk in &lump.shells {
                if let Some(shell) = self.shells.get(sk) {
                    set.extend(shell.faces.iter().copied());
                }
            }
        }
        Some(set)
    }

    /// Returns all unique points reachable from a body.
    pub fn body_points(&self, key: BodyKey) -> Option<FxHashSet<PointKey>> {
        let faces = self.body_faces(key)?;
        let mut set = FxHashSet::default();
        for fk in faces {
            if let Some(points) = self.face_points(fk) {
                set.extend(points);
            }
        }
        Some(set)
    }
}

// =============================================================================
// Upward traversal: find parent topologies
// =============================================================================

impl TopologyArena {
    /// Returns the curves that use a point.
    pub fn point_curves(&self, key: PointKey) -> Vec<CurveKey> {
        self.point_to_curves
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the co-edges that use a curve.
    pub fn curve_coedges(&self, key: CurveKey) -> Vec<CoEdgeKey> {
        self.curve_to_coedges
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the loop that owns a co-edge.
    pub fn coedge_loop(&self, key: CoEdgeKey) -> Option<LoopKey> {
        self.coedge_to_loop.get(&key).copied()
    }

    /// Returns the faces that own a loop.
    pub fn loop_faces(&self, key: LoopKey) -> Vec<FaceKey> {
        self.loop_to_faces
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the shells that contain a face.
    pub fn face_shells(&self, key: FaceKey) -> Vec<ShellKey> {
        self.face_to_shells
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the lumps that contain a shell.
    pub fn shell_lumps(&self, key: ShellKey) -> Vec<LumpKey> {
        self.shell_to_lumps
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the body that currently holds a lump.
    pub fn lump_body(&self, key: LumpKey) -> Option<BodyKey> {
        self.lumps.get(key).and_then(|l| l.body)
    }

    /// Returns the faces adjacent to `key` across a shared curve.
    pub fn adjacent_faces(&self, key: FaceKey) -> Vec<FaceKey> {
        let Some(curves) = self.face_curves(key) else {
            return Vec::new();
        };
        let mut result = FxHashSet::default();
        for ck in curves {
            for ce in self.curve_coedges(ck) {
                let Some(lk) = self.coedge_loop(ce) else {
                    continue;
                };
                for fk in self.loop_faces(lk) {
                    if fk != key {
                        result.insert(fk);
                    }
                }
            }
        }
        result.into_iter().collect()
    }
}
