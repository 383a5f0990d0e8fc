// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory shape tree implementing [`ShapeKernel`].
//!
//! Native shapes are stored once in a slot map and referenced by
//! [`ShapeRef`], an identity plus an orientation. Reusing a `ShapeRef` (or
//! its [`ShapeRef::reversed`] twin) in two parents shares the sub-shape, the
//! same way a kernel shares edges between adjacent faces.

use slotmap::{new_key_type, SlotMap};

use crate::kernel::{Orientation, ShapeKernel, ShapeKind};

new_key_type! {
    /// Identity of a native shape in a [`ShapeTree`].
    pub struct ShapeId;
}

/// One occurrence of a native shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeRef {
    pub id: ShapeId,
    pub orientation: Orientation,
}

impl ShapeRef {
    /// The same shape with forward and reversed swapped.
    pub fn reversed(self) -> Self {
        self.oriented(self.orientation.reversed())
    }

    /// The same shape with the given orientation.
    pub fn oriented(self, orientation: Orientation) -> Self {
        Self {
            id: self.id,
            orientation,
        }
    }
}

#[derive(Debug, Clone)]
struct ShapeNode {
    kind: ShapeKind,
    children: Vec<ShapeRef>,
    coords: Option<[f64; 3]>,
}

/// A hand-built native shape model.
#[derive(Debug, Clone, Default)]
pub struct ShapeTree {
    nodes: SlotMap<ShapeId, ShapeNode>,
}

impl ShapeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape of any kind with the given children. No structural
    /// checks are made, so malformed input can be modelled.
    pub fn add(&mut self, kind: ShapeKind, children: &[ShapeRef]) -> ShapeRef {
        let id = self.nodes.insert(ShapeNode {
            kind,
            children: children.to_vec(),
            coords: None,
        });
        ShapeRef {
            id,
            orientation: Orientation::Forward,
        }
    }

    pub fn vertex(&mut self, x: f64, y: f64, z: f64) -> ShapeRef {
        let id = self.nodes.insert(ShapeNode {
            kind: ShapeKind::Vertex,
            children: Vec::new(),
            coords: Some([x, y, z]),
        });
        ShapeRef {
            id,
            orientation: Orientation::Forward,
        }
    }

    /// Adds an edge running from `start` to `end`. A closed edge has the
    /// same start and end vertex and stores it once.
    pub fn edge(&mut self, start: ShapeRef, end: ShapeRef) -> ShapeRef {
        if start.id == end.id {
            self.add(ShapeKind::Edge, &[start])
        } else {
            self.add(
                ShapeKind::Edge,
                &[start, end.oriented(Orientation::Reversed)],
            )
        }
    }

    /// Adds a wire; edges are given in cyclic order with their orientation
    /// in the wire.
    pub fn wire(&mut self, edges: &[ShapeRef]) -> ShapeRef {
        self.add(ShapeKind::Wire, edges)
    }

    /// Adds a face; the first wire is the outer boundary.
    pub fn face(&mut self, wires: &[ShapeRef]) -> ShapeRef {
        self.add(ShapeKind::Face, wires)
    }

    pub fn shell(&mut self, faces: &[ShapeRef]) -> ShapeRef {
        self.add(ShapeKind::Shell, faces)
    }

    pub fn solid(&mut self, shells: &[ShapeRef]) -> ShapeRef {
        self.add(ShapeKind::Solid, shells)
    }

    pub fn compound(&mut self, shapes: &[ShapeRef]) -> ShapeRef {
        self.add(ShapeKind::Compound, shapes)
    }

    /// Number of native shapes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn collect(&self, shape: ShapeRef, kind: ShapeKind, out: &mut Vec<ShapeRef>) {
        let Some(node) = self.nodes.get(shape.id) else {
            return;
        };
        for &child in &node.children {
            let occurrence = child.oriented(shape.orientation.compose(child.orientation));
            match self.nodes.get(child.id) {
                Some(c) if c.kind == kind => out.push(occurrence),
                Some(c) if rank(c.kind) < rank(kind) => self.collect(occurrence, kind, out),
                _ => {}
            }
        }
    }
}

fn rank(kind: ShapeKind) -> u8 {
    match kind {
        ShapeKind::Compound => 0,
        ShapeKind::Solid => 1,
        ShapeKind::Shell => 2,
        ShapeKind::Face => 3,
        ShapeKind::Wire => 4,
        ShapeKind::Edge => 5,
        ShapeKind::Vertex => 6,
    }
}

impl ShapeKernel for ShapeTree {
    type Shape = ShapeRef;
    type Key = ShapeId;

    fn kind(&self, shape: &ShapeRef) -> ShapeKind {
        self.nodes
            .get(shape.id)
            .map(|n| n.kind)
            .unwrap_or(ShapeKind::Compound)
    }

    /// Occurrences of `kind` below `shape`, depth first. Orientation is
    /// composed along the path. Edge vertices come out start first even on
    /// a reversed edge.
    fn enumerate_children(&self, shape: &ShapeRef, kind: ShapeKind) -> Vec<ShapeRef> {
        let mut out = Vec::new();
        self.collect(*shape, kind, &mut out);
        out
    }

    fn shape_identity(&self, shape: &ShapeRef) -> ShapeId {
        shape.id
    }

    fn orientation(&self, shape: &ShapeRef) -> Orientation {
        shape.orientation
    }

    fn coordinates(&self, vertex: &ShapeRef) -> Option<[f64; 3]> {
        self.nodes.get(vertex.id).and_then(|n| n.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_edge_in_wire() {
        let mut tree = ShapeTree::new();
        let a = tree.vertex(0.0, 0.0, 0.0);
        let b = tree.vertex(1.0, 0.0, 0.0);
        let e = tree.edge(a, b);
        let w = tree.wire(&[e.reversed()]);

        let edges = tree.enumerate_children(&w, ShapeKind::Edge);
        assert_eq!(edges.len(), 1);
        assert_eq!(tree.orientation(&edges[0]), Orientation::Reversed);
        assert_eq!(tree.shape_identity(&edges[0]), tree.shape_identity(&e));

        let verts = tree.enumerate_children(&edges[0], ShapeKind::Vertex);
        assert_eq!(tree.coordinates(&verts[0]), Some([0.0, 0.0, 0.0]));
        assert_eq!(tree.coordinates(&verts[1]), Some([1.0, 0.0, 0.0]));
    }

    #[test]
    fn enumerate_skips_levels() {
        let mut tree = ShapeTree::new();
        let a = tree.vertex(0.0, 0.0, 0.0);
        let e = tree.edge(a, a);
        let w = tree.wire(&[e]);
        let f = tree.face(&[w]);
        let s = tree.shell(&[f]);
        let solid = tree.solid(&[s]);
        let body = tree.compound(&[solid]);

        assert_eq!(tree.enumerate_children(&body, ShapeKind::Solid), vec![solid]);
        assert_eq!(tree.enumerate_children(&body, ShapeKind::Face).len(), 1);
        assert_eq!(tree.enumerate_children(&e, ShapeKind::Vertex).len(), 1);
        assert!(tree.enumerate_children(&a, ShapeKind::Vertex).is_empty());
        assert_eq!(tree.kind(&f), ShapeKind::Face);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn non_vertex_has_no_coordinates() {
        let mut tree = ShapeTree::new();
        let a = tree.vertex(0.0, 0.0, 0.0);
        let e = tree.edge(a, a);
        assert_eq!(tree.coordinates(&e), None);
    }
}
