// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import construction: native shapes in, deduplicated graph out.
//!
//! An [`ImportSession`] owns one arena and one [`ShapeRegistry`]. Every
//! node is registered as soon as it is created and before its children are
//! populated; a registry hit on a shared shape only adds a parent link.
//! Each body import is all-or-nothing: the session logs the nodes and
//! registry entries it creates and takes back exactly those if anything
//! fails, so a failed import costs no more than the work it did.
//!
//! A registry entry whose node has since been removed from the arena, e.g.
//! by [`TopologyArena::delete_body`], is treated as a miss and rebuilt.

use crate::arena::{Sense, TopologyArena};
use crate::error::{Error, Result};
use crate::kernel::{ShapeKernel, ShapeKind};
use crate::keys::*;
use crate::registry::ShapeRegistry;

/// Builds topology graphs from one kernel.
pub struct ImportSession<'k, K: ShapeKernel> {
    kernel: &'k K,
    arena: TopologyArena,
    registry: ShapeRegistry<K::Key>,
    /// Nodes created by the import in progress, oldest first.
    created: Vec<TopologyKey>,
}

impl<'k, K: ShapeKernel> ImportSession<'k, K> {
    /// Starts a session with an empty arena.
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            arena: TopologyArena::new(),
            registry: ShapeRegistry::new(),
            created: Vec::new(),
        }
    }

    pub fn arena(&self) -> &TopologyArena {
        &self.arena
    }

    /// Mutable access to the arena, e.g. to delete a body. Later imports
    /// rebuild whatever was removed here.
    pub fn arena_mut(&mut self) -> &mut TopologyArena {
        &mut self.arena
    }

    pub fn registry(&self) -> &ShapeRegistry<K::Key> {
        &self.registry
    }

    /// Drops registry entries for nodes that no longer exist. Lookups skip
    /// such entries anyway; this only reclaims their memory.
    pub fn prune_registry(&mut self) {
        self.registry.prune(&self.arena);
    }

    /// Imports one native body (a compound of solids, or a single solid).
    ///
    /// On error the session is left exactly as it was before the call.
    pub fn import_body(&mut self, shape: &K::Shape) -> Result<BodyKey> {
        self.created.clear();
        match self.build_body(shape) {
            Ok(body) => {
                self.registry.commit();
                let counts = self.arena.counts();
                tracing::info!(
                    lumps = self.arena.body_lumps(body).map_or(0, <[LumpKey]>::len),
                    points = counts.points,
                    curves = counts.curves,
                    coedges = counts.coedges,
                    faces = counts.faces,
                    "Imported body"
                );
                Ok(body)
            }
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    discarded = self.created.len(),
                    "Body import failed, rolling back"
                );
                self.arena.discard(&self.created);
                self.registry.rollback();
                self.created.clear();
                Err(err)
            }
        }
    }

    /// Checks the graph and hands it over.
    pub fn finish(self) -> Result<TopologyArena> {
        self.arena.check()?;
        Ok(self.arena)
    }

    /// A registry hit, unless its node is gone from the arena.
    fn live<N: Into<TopologyKey> + Copy>(&self, hit: Option<N>) -> Option<N> {
        hit.filter(|&k| self.arena.contains(k.into()))
    }

    fn build_body(&mut self, shape: &K::Shape) -> Result<BodyKey> {
        let solids = if self.kernel.kind(shape) == ShapeKind::Solid {
            vec![shape.clone()]
        } else {
            self.kernel.enumerate_children(shape, ShapeKind::Solid)
        };
        if solids.is_empty() {
            return Err(Error::malformed(TopologyType::Body, "shape has no solids"));
        }

        let body = self.arena.new_body();
        self.created.push(body.into());
        for solid in &solids {
            let lump = self.resolve_lump(solid)?;
            if self.arena.lump_body(lump).is_some() {
                return Err(Error::malformed(
                    TopologyType::Lump,
                    "solid already belongs to a body",
                ));
            }
            self.arena.attach_lump(body, lump)?;
        }
        Ok(body)
    }

    fn resolve_lump(&mut self, solid: &K::Shape) -> Result<LumpKey> {
        let id = self.kernel.shape_identity(solid);
        if let Some(lump) = self.live(self.registry.lump(id)) {
            return Ok(lump);
        }

        let lump = self.arena.new_lump();
        self.created.push(lump.into());
        self.registry.insert_lump(id, lump);

        let shells = self.kernel.enumerate_children(solid, ShapeKind::Shell);
        if shells.is_empty() {
            return Err(Error::malformed(TopologyType::Lump, "solid has no shells"));
        }
        for shell in &shells {
            let sk = self.resolve_shell(shell)?;
            self.arena.push_shell(lump, sk)?;
        }
        tracing::debug!(shells = shells.len(), "Built lump");
        Ok(lump)
    }

    fn resolve_shell(&mut self, shell: &K::Shape) -> Result<ShellKey> {
        let id = self.kernel.shape_identity(shell);
        if let Some(sk) = self.live(self.registry.shell(id)) {
            return Ok(sk);
        }

        let sense = self
            .kernel
            .orientation(shell)
            .sense()
            .unwrap_or(Sense::Unknown);
        let sk = self.arena.new_shell(sense);
        self.created.push(sk.into());
        self.registry.insert_shell(id, sk);

        let faces = self.kernel.enumerate_children(shell, ShapeKind::Face);
        if faces.is_empty() {
            return Err(Error::malformed(TopologyType::Shell, "shell has no faces"));
        }
        for face in &faces {
            let fk = self.resolve_face(face)?;
            self.arena.push_face(sk, fk)?;
        }
        Ok(sk)
    }

    fn resolve_face(&mut self, face: &K::Shape) -> Result<FaceKey> {
        let id = self.kernel.shape_identity(face);
        if let Some(fk) = self.live(self.registry.face(id)) {
            return Ok(fk);
        }

        let shell_sense = self
            .kernel
            .orientation(face)
            .sense()
            .unwrap_or(Sense::Unknown);
        let fk = self.arena.new_face(Sense::Forward, shell_sense);
        self.created.push(fk.into());
        self.registry.insert_face(id, fk);

        let wires = self.kernel.enumerate_children(face, ShapeKind::Wire);
        if wires.is_empty() {
            return Err(Error::FaceWithoutLoops);
        }
        for wire in &wires {
            let lk = self.resolve_loop(wire)?;
            self.arena.push_loop(fk, lk)?;
        }
        Ok(fk)
    }

    fn resolve_loop(&mut self, wire: &K::Shape) -> Result<LoopKey> {
        let id = self.kernel.shape_identity(wire);
        if let Some(lk) = self.live(self.registry.loop_key(id)) {
            return Ok(lk);
        }

        let lk = self.arena.new_loop();
        self.created.push(lk.into());
        self.registry.insert_loop(id, lk);

        let edges = self.kernel.enumerate_children(wire, ShapeKind::Edge);
        if edges.is_empty() {
            return Err(Error::EmptyLoop);
        }
        for edge in &edges {
            let orientation = self.kernel.orientation(edge);
            let sense = orientation.sense().ok_or_else(|| {
                Error::malformed(
                    TopologyType::CoEdge,
                    format!("edge use has {orientation:?} orientation"),
                )
            })?;
            let curve = self.resolve_curve(edge, sense)?;
            let coedge = self.arena.add_coedge(curve, sense)?;
            self.created.push(coedge.into());
            self.arena.push_coedge(lk, coedge)?;
        }
        Ok(lk)
    }

    fn resolve_curve(&mut self, edge: &K::Shape, sense: Sense) -> Result<CurveKey> {
        let id = self.kernel.shape_identity(edge);
        if let Some(curve) = self.registry.resolve_curve(id, sense, &self.arena) {
            return Ok(curve);
        }

        let vertices = self.kernel.enumerate_children(edge, ShapeKind::Vertex);
        let (start, end) = match vertices.as_slice() {
            [only] => {
                let p = self.resolve_point(only)?;
                (p, p)
            }
            [first, last] => (self.resolve_point(first)?, self.resolve_point(last)?),
            other => {
                return Err(Error::malformed(
                    TopologyType::Curve,
                    format!("edge has {} vertices", other.len()),
                ));
            }
        };
        let curve = self.arena.add_curve(start, end)?;
        self.created.push(curve.into());
        self.registry.insert_curve(id, sense, curve);
        Ok(curve)
    }

    fn resolve_point(&mut self, vertex: &K::Shape) -> Result<PointKey> {
        let id = self.kernel.shape_identity(vertex);
        if let Some(p) = self.live(self.registry.point(id)) {
            return Ok(p);
        }
        let [x, y, z] = self
            .kernel
            .coordinates(vertex)
            .ok_or_else(|| Error::malformed(TopologyType::Point, "vertex has no coordinates"))?;
        let p = self.arena.add_point(x, y, z);
        self.created.push(p.into());
        self.registry.insert_point(id, p);
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::kernel::Orientation;
    use crate::shape_tree::{ShapeRef, ShapeTree};

    /// A unit-square face built from four fresh edges.
    fn square(tree: &mut ShapeTree, z: f64) -> ShapeRef {
        let v = [
            tree.vertex(0.0, 0.0, z),
            tree.vertex(1.0, 0.0, z),
            tree.vertex(1.0, 1.0, z),
            tree.vertex(0.0, 1.0, z),
        ];
        let edges: Vec<_> = (0..4).map(|i| tree.edge(v[i], v[(i + 1) % 4])).collect();
        let wire = tree.wire(&edges);
        tree.face(&[wire])
    }

    fn solid_of(tree: &mut ShapeTree, faces: &[ShapeRef]) -> ShapeRef {
        let shell = tree.shell(faces);
        tree.solid(&[shell])
    }

    #[test]
    fn single_face_solid() {
        let mut tree = ShapeTree::new();
        let face = square(&mut tree, 0.0);
        let solid = solid_of(&mut tree, &[face]);
        let body_shape = tree.compound(&[solid]);

        let mut session = ImportSession::new(&tree);
        let body = session.import_body(&body_shape).unwrap();
        let arena = session.finish().unwrap();

        let counts = arena.counts();
        assert_eq!(counts.points, 4);
        assert_eq!(counts.curves, 4);
        assert_eq!(counts.coedges, 4);
        assert_eq!(counts.loops, 1);
        assert_eq!(counts.faces, 1);
        assert_eq!(arena.body_lumps(body).unwrap().len(), 1);
    }

    #[test]
    fn bare_solid_is_accepted() {
        let mut tree = ShapeTree::new();
        let face = square(&mut tree, 0.0);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&solid).unwrap();
        assert_eq!(session.arena().counts().lumps, 1);
    }

    #[test]
    fn shared_shell_gets_two_lump_parents() {
        let mut tree = ShapeTree::new();
        let face = square(&mut tree, 0.0);
        let shell = tree.shell(&[face]);
        let a = tree.solid(&[shell]);
        let b = tree.solid(&[shell]);
        let body_shape = tree.compound(&[a, b]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&body_shape).unwrap();
        let arena = session.finish().unwrap();

        assert_eq!(arena.counts().shells, 1);
        assert_eq!(arena.counts().lumps, 2);
        let (sk, _) = arena.shells().next().unwrap();
        assert_eq!(arena.shell_lumps(sk).len(), 2);
    }

    #[test]
    fn closed_edge_makes_closed_curve() {
        let mut tree = ShapeTree::new();
        let v = tree.vertex(1.0, 0.0, 0.0);
        let circle = tree.edge(v, v);
        let wire = tree.wire(&[circle]);
        let face = tree.face(&[wire]);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&solid).unwrap();
        let arena = session.finish().unwrap();

        let (ck, _) = arena.curves().next().unwrap();
        assert!(arena.is_closed_curve(ck));
        assert_eq!(arena.counts().points, 1);
    }

    #[test]
    fn internal_edge_is_fatal_and_rolled_back() {
        let mut tree = ShapeTree::new();
        let a = tree.vertex(0.0, 0.0, 0.0);
        let b = tree.vertex(1.0, 0.0, 0.0);
        let e = tree.edge(a, b);
        let wire = tree.wire(&[e.oriented(Orientation::Internal)]);
        let face = tree.face(&[wire]);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        let err = session.import_body(&solid).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
        assert_eq!(session.arena().counts().total(), 0);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn face_without_wires_is_rejected() {
        let mut tree = ShapeTree::new();
        let face = tree.face(&[]);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        assert!(matches!(
            session.import_body(&solid),
            Err(Error::FaceWithoutLoops)
        ));
        assert_eq!(session.arena().counts().total(), 0);
    }

    #[test]
    fn edge_with_three_vertices_is_rejected() {
        let mut tree = ShapeTree::new();
        let vs = [
            tree.vertex(0.0, 0.0, 0.0),
            tree.vertex(1.0, 0.0, 0.0),
            tree.vertex(2.0, 0.0, 0.0),
        ];
        let edge = tree.add(ShapeKind::Edge, &vs);
        let wire = tree.wire(&[edge]);
        let face = tree.face(&[wire]);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        let err = session.import_body(&solid).unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed {
                entity: TopologyType::Curve,
                ..
            }
        ));
    }

    #[test]
    fn failed_import_keeps_earlier_body() {
        let mut tree = ShapeTree::new();
        let good_face = square(&mut tree, 0.0);
        let good = solid_of(&mut tree, &[good_face]);
        let bad_face = tree.face(&[]);
        let bad = solid_of(&mut tree, &[good_face, bad_face]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&good).unwrap();
        let before = session.arena().counts();

        assert!(session.import_body(&bad).is_err());
        assert_eq!(session.arena().counts(), before);
        session.finish().unwrap();
    }

    #[test]
    fn solid_in_two_bodies_is_rejected() {
        let mut tree = ShapeTree::new();
        let face = square(&mut tree, 0.0);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&solid).unwrap();
        let err = session.import_body(&solid).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MalformedInput);
        assert_eq!(session.arena().counts().bodies, 1);
    }

    #[test]
    fn two_bodies_share_a_face() {
        let mut tree = ShapeTree::new();
        let shared = square(&mut tree, 0.0);
        let top = square(&mut tree, 1.0);
        let bottom = square(&mut tree, -1.0);
        let upper = solid_of(&mut tree, &[shared, top]);
        let lower = solid_of(&mut tree, &[shared.reversed(), bottom]);

        let mut session = ImportSession::new(&tree);
        session.import_body(&upper).unwrap();
        session.import_body(&lower).unwrap();
        let arena = session.finish().unwrap();

        assert_eq!(arena.counts().bodies, 2);
        assert_eq!(arena.counts().faces, 3);
        let shared_face = arena
            .faces()
            .find(|(fk, _)| arena.face_shells(*fk).len() == 2)
            .map(|(fk, _)| fk);
        assert!(shared_face.is_some());
    }

    #[test]
    fn reimport_after_delete_rebuilds_body() {
        let mut tree = ShapeTree::new();
        let face = square(&mut tree, 0.0);
        let solid = solid_of(&mut tree, &[face]);

        let mut session = ImportSession::new(&tree);
        let first = session.import_body(&solid).unwrap();
        let counts = session.arena().counts();
        session.arena_mut().delete_body(first).unwrap();
        assert_eq!(session.arena().counts().total(), 0);

        let again = session.import_body(&solid).unwrap();
        assert_ne!(again, first);
        assert_eq!(session.arena().counts(), counts);
        session.finish().unwrap();
    }

    #[test]
    fn failed_import_unlinks_shared_nodes() {
        let mut tree = ShapeTree::new();
        let shared = square(&mut tree, 0.0);
        let good = solid_of(&mut tree, &[shared]);
        let bad_face = tree.face(&[]);
        let bad = solid_of(&mut tree, &[shared.reversed(), bad_face]);

        let mut session = ImportSession::new(&tree);
        let body = session.import_body(&good).unwrap();
        assert!(session.import_body(&bad).is_err());

        let arena = session.arena();
        let (fk, _) = arena.faces().next().unwrap();
        assert_eq!(arena.face_shells(fk).len(), 1);
        for (ck, _) in arena.curves() {
            assert_eq!(arena.curve_coedges(ck).len(), 1);
        }
        assert!(arena.contains(TopologyKey::Body(body)));
        assert!(session.registry().face(tree.shape_identity(&bad_face)).is_none());
        session.finish().unwrap();
    }
}
