// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary to the CAD kernel that owns the native shapes.
//!
//! Import construction only ever asks four questions of a kernel: which
//! sub-shapes of a kind a shape has, what identity a shape has, how a shape
//! is oriented within its parent, and where a vertex is. Codec reads never
//! touch the kernel.

use std::fmt::Debug;
use std::hash::Hash;

use crate::arena::Sense;

/// Native shape kinds, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Compound,
    Solid,
    Shell,
    Face,
    Wire,
    Edge,
    Vertex,
}

/// Orientation of a native shape occurrence within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    Reversed,
    Internal,
    External,
}

impl Orientation {
    /// Composes a parent's orientation with a child's local one.
    pub fn compose(self, child: Orientation) -> Orientation {
        match (self, child) {
            (Orientation::Reversed, Orientation::Forward) => Orientation::Reversed,
            (Orientation::Reversed, Orientation::Reversed) => Orientation::Forward,
            (Orientation::Forward, c) | (Orientation::Reversed, c) => c,
            (p, _) => p,
        }
    }

    /// Flips forward and reversed.
    pub fn reversed(self) -> Orientation {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
            other => other,
        }
    }

    /// Maps to a graph sense. Internal and external occurrences have no
    /// sense along the curve.
    pub fn sense(self) -> Option<Sense> {
        match self {
            Orientation::Forward => Some(Sense::Forward),
            Orientation::Reversed => Some(Sense::Reversed),
            Orientation::Internal | Orientation::External => None,
        }
    }
}

/// Shape queries a kernel must answer for import construction.
///
/// `shape_identity` must not depend on orientation: the forward and the
/// reversed occurrence of one edge share a key. Edge vertices must be
/// enumerated in the edge's canonical direction, start first.
pub trait ShapeKernel {
    /// A native shape occurrence (identity plus orientation).
    type Shape: Clone;
    /// Orientation-independent identity of a native shape.
    type Key: Copy + Eq + Hash + Debug;

    /// Kind of a shape.
    fn kind(&self, shape: &Self::Shape) -> ShapeKind;

    /// Sub-shapes of `kind` below `shape`, in the kernel's order. Wires
    /// yield their edges in cyclic order.
    fn enumerate_children(&self, shape: &Self::Shape, kind: ShapeKind) -> Vec<Self::Shape>;

    /// Identity key of a shape.
    fn shape_identity(&self, shape: &Self::Shape) -> Self::Key;

    /// Orientation of a shape occurrence.
    fn orientation(&self, shape: &Self::Shape) -> Orientation;

    /// Coordinates of a vertex; `None` if `vertex` is not one.
    fn coordinates(&self, vertex: &Self::Shape) -> Option<[f64; 3]>;
}
