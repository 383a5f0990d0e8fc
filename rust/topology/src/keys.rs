// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Each B-rep node gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other nodes are removed (generational indices), so a key held across a
//! teardown simply stops resolving instead of aliasing a new node.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a point (vertex position).
    pub struct PointKey;

    /// Key for a curve (identity of an underlying 1-D geometric entity).
    pub struct CurveKey;

    /// Key for a co-edge (one oriented use of a curve inside a loop).
    pub struct CoEdgeKey;

    /// Key for a loop (ordered cycle of co-edges bounding a face).
    pub struct LoopKey;

    /// Key for a face (identity of an underlying 2-D geometric entity).
    pub struct FaceKey;

    /// Key for a shell (connected set of faces).
    pub struct ShellKey;

    /// Key for a lump (connected solid region).
    pub struct LumpKey;

    /// Key for a body (top-level container of lumps).
    pub struct BodyKey;
}

/// A key that can reference any topology node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKey {
    Point(PointKey),
    Curve(CurveKey),
    CoEdge(CoEdgeKey),
    Loop(LoopKey),
    Face(FaceKey),
    Shell(ShellKey),
    Lump(LumpKey),
    Body(BodyKey),
}

impl TopologyKey {
    /// Returns the topology type of this key.
    pub fn topology_type(&self) -> TopologyType {
        match self {
            TopologyKey::Point(_) => TopologyType::Point,
            TopologyKey::Curve(_) => TopologyType::Curve,
            TopologyKey::CoEdge(_) => TopologyType::CoEdge,
            TopologyKey::Loop(_) => TopologyType::Loop,
            TopologyKey::Face(_) => TopologyType::Face,
            TopologyKey::Shell(_) => TopologyType::Shell,
            TopologyKey::Lump(_) => TopologyType::Lump,
            TopologyKey::Body(_) => TopologyType::Body,
        }
    }
}

/// Discriminant for topology node types, in dependency order (leaves first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopologyType {
    Point = 0,
    Curve = 1,
    CoEdge = 2,
    Loop = 3,
    Face = 4,
    Shell = 5,
    Lump = 6,
    Body = 7,
}

impl TopologyType {
    /// All node types, leaves first. This is also the table order of the
    /// binary format.
    pub const ALL: [TopologyType; 8] = [
        TopologyType::Point,
        TopologyType::Curve,
        TopologyType::CoEdge,
        TopologyType::Loop,
        TopologyType::Face,
        TopologyType::Shell,
        TopologyType::Lump,
        TopologyType::Body,
    ];

    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyType::Point => "Point",
            TopologyType::Curve => "Curve",
            TopologyType::CoEdge => "CoEdge",
            TopologyType::Loop => "Loop",
            TopologyType::Face => "Face",
            TopologyType::Shell => "Shell",
            TopologyType::Lump => "Lump",
            TopologyType::Body => "Body",
        }
    }
}

impl std::fmt::Display for TopologyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_from_key {
    ($($key:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$key> for TopologyKey {
                fn from(k: $key) -> Self {
                    TopologyKey::$variant(k)
                }
            }
        )*
    };
}

impl_from_key! {
    PointKey => Point,
    CurveKey => Curve,
    CoEdgeKey => CoEdge,
    LoopKey => Loop,
    FaceKey => Face,
    ShellKey => Shell,
    LumpKey => Lump,
    BodyKey => Body,
}
