// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for B-rep topology nodes.
//!
//! The [`TopologyArena`] is the central owner of all topology data. Every node
//! (point, curve, co-edge, loop, face, shell, lump, body) lives inside slot
//! maps with stable, generational keys. Bidirectional adjacency indices enable
//! both downward traversal (body → lumps → … → points) and upward traversal
//! (point → which curves use it → … → which body owns the lump).
//!
//! ## Sharing
//!
//! Nodes may have several parents: a curve bounding two faces is wrapped by
//! two co-edges, a face may sit in two shells, a shell may be shared by two
//! lumps. The graph never forms a cycle downward. Co-edges are the exception
//! to fan-in: a co-edge is one oriented use and belongs to exactly one loop.
//! Lumps point back to their body, which is a reference and not ownership.

use nalgebra::Matrix4;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::attributes::AttributeRecord;
use crate::keys::*;
use crate::transform::BoundingBox;

/// Orientation of a use relative to the canonical direction of what it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sense {
    Forward,
    Reversed,
    #[default]
    Unknown,
}

impl Sense {
    /// Returns the integer code used by the binary format.
    pub fn code(self) -> i32 {
        match self {
            Sense::Forward => 0,
            Sense::Reversed => 1,
            Sense::Unknown => -1,
        }
    }

    /// Parses the integer code used by the binary format.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Sense::Forward),
            1 => Some(Sense::Reversed),
            -1 => Some(Sense::Unknown),
            _ => None,
        }
    }

    /// Flips forward and reversed; unknown stays unknown.
    pub fn reversed(self) -> Self {
        match self {
            Sense::Forward => Sense::Reversed,
            Sense::Reversed => Sense::Forward,
            Sense::Unknown => Sense::Unknown,
        }
    }
}

/// Data stored for a point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Data stored for a curve: its two endpoints, which coincide for a closed
/// curve.
#[derive(Debug, Clone)]
pub struct CurveData {
    pub start: PointKey,
    pub end: PointKey,
    pub sense: Sense,
}

/// Data stored for a co-edge: one oriented use of a curve.
#[derive(Debug, Clone)]
pub struct CoEdgeData {
    pub curve: CurveKey,
    pub sense: Sense,
}

/// Data stored for a loop: co-edges in cyclic order.
#[derive(Debug, Clone)]
pub struct LoopData {
    pub coedges: Vec<CoEdgeKey>,
}

/// Data stored for a face. The first loop is the outer boundary, the rest
/// are holes.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub loops: Vec<LoopKey>,
    /// Sense of the face relative to its underlying surface.
    pub sense: Sense,
    /// Sense of the face relative to the shells that use it.
    pub shell_sense: Sense,
}

/// Data stored for a shell.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceKey>,
    /// Sense relative to the owning lump.
    pub sense: Sense,
}

/// Data stored for a lump.
#[derive(Debug, Clone)]
pub struct LumpData {
    pub shells: Vec<ShellKey>,
    /// Back reference to the body currently holding this lump.
    pub body: Option<BodyKey>,
}

/// Data stored for a body.
#[derive(Debug, Clone)]
pub struct BodyData {
    pub lumps: Vec<LumpKey>,
    /// Accumulated transform, applied as one composed matrix.
    pub transform: Matrix4<f64>,
    pub(crate) bounding_box: Option<BoundingBox>,
}

/// The central arena that owns all topology nodes and their adjacency indices.
///
/// # Example
///
/// ```
/// use brep_lite_topology::TopologyArena;
///
/// let mut arena = TopologyArena::new();
/// let p0 = arena.add_point(0.0, 0.0, 0.0);
/// let p1 = arena.add_point(1.0, 0.0, 0.0);
/// arena.add_curve(p0, p1).unwrap();
///
/// assert_eq!(arena.point_count(), 2);
/// assert_eq!(arena.curve_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TopologyArena {
    // Node storage
    pub(crate) points: SlotMap<PointKey, PointData>,
    pub(crate) curves: SlotMap<CurveKey, CurveData>,
    pub(crate) coedges: SlotMap<CoEdgeKey, CoEdgeData>,
    pub(crate) loops: SlotMap<LoopKey, LoopData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) shells: SlotMap<ShellKey, ShellData>,
    pub(crate) lumps: SlotMap<LumpKey, LumpData>,
    pub(crate) bodies: SlotMap<BodyKey, BodyData>,

    // Upward adjacency: child → parents
    pub(crate) point_to_curves: FxHashMap<PointKey, FxHashSet<CurveKey>>,
    pub(crate) curve_to_coedges: FxHashMap<CurveKey, FxHashSet<CoEdgeKey>>,
    pub(crate) coedge_to_loop: FxHashMap<CoEdgeKey, LoopKey>,
    pub(crate) loop_to_faces: FxHashMap<LoopKey, FxHashSet<FaceKey>>,
    pub(crate) face_to_shells: FxHashMap<FaceKey, FxHashSet<ShellKey>>,
    pub(crate) shell_to_lumps: FxHashMap<ShellKey, FxHashSet<LumpKey>>,

    // Metadata
    pub(crate) attributes: FxHashMap<TopologyKey, Vec<AttributeRecord>>,

    // Live per-node state read and written by typed attributes
    pub(crate) tolerances: FxHashMap<TopologyKey, f64>,
    pub(crate) names: FxHashMap<TopologyKey, String>,
}

impl TopologyArena {
    /// Creates a new, empty topology arena.
    pub fn new() -> Self {
        Self {
            points: SlotMap::with_key(),
            curves: SlotMap::with_key(),
            coedges: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            shells: SlotMap::with_key(),
            lumps: SlotMap::with_key(),
            bodies: SlotMap::with_key(),

            point_to_curves: FxHashMap::default(),
            curve_to_coedges: FxHashMap::default(),
            coedge_to_loop: FxHashMap::default(),
            loop_to_faces: FxHashMap::default(),
            face_to_shells: FxHashMap::default(),
            shell_to_lumps: FxHashMap::default(),

            attributes: FxHashMap::default(),

            tolerances: FxHashMap::default(),
            names: FxHashMap::default(),
        }
    }

    // --- Point operations ---

    /// Adds a point at the given 3D coordinates.
    pub fn add_point(&mut self, x: f64, y: f64, z: f64) -> PointKey {
        self.points.insert(PointData { x, y, z })
    }

    /// Returns the point data for the given key, or `None` if not found.
    pub fn point(&self, key: PointKey) -> Option<&PointData> {
        self.points.get(key)
    }

    /// Returns the coordinates of a point as `[x, y, z]`.
    pub fn point_coords(&self, key: PointKey) -> Option<[f64; 3]> {
        self.points.get(key).map(|p| [p.x, p.y, p.z])
    }

    /// Returns the number of points in the arena.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Iterates over all points.
    pub fn points(&self) -> impl Iterator<Item = (PointKey, &PointData)> {
        self.points.iter()
    }

    // --- Curve operations ---

    /// Returns the curve data for the given key, or `None` if not found.
    pub fn curve(&self, key: CurveKey) -> Option<&CurveData> {
        self.curves.get(key)
    }

    /// Returns the number of curves in the arena.
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Iterates over all curves.
    pub fn curves(&self) -> impl Iterator<Item = (CurveKey, &CurveData)> {
        self.curves.iter()
    }

    // --- CoEdge operations ---

    /// Returns the co-edge data for the given key, or `None` if not found.
    pub fn coedge(&self, key: CoEdgeKey) -> Option<&CoEdgeData> {
        self.coedges.get(key)
    }

    /// Returns the number of co-edges in the arena.
    pub fn coedge_count(&self) -> usize {
        self.coedges.len()
    }

    /// Iterates over all co-edges.
    pub fn coedges(&self) -> impl Iterator<Item = (CoEdgeKey, &CoEdgeData)> {
        self.coedges.iter()
    }

    // --- Loop operations ---

    /// Returns the loop data for the given key, or `None` if not found.
    pub fn loop_data(&self, key: LoopKey) -> Option<&LoopData> {
        self.loops.get(key)
    }

    /// Returns the number of loops in the arena.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Iterates over all loops.
    pub fn loops(&self) -> impl Iterator<Item = (LoopKey, &LoopData)> {
        self.loops.iter()
    }

    // --- Face operations ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the number of faces in the arena.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &FaceData)> {
        self.faces.iter()
    }

    // --- Shell operations ---

    /// Returns the shell data for the given key, or `None` if not found.
    pub fn shell(&self, key: ShellKey) -> Option<&ShellData> {
        self.shells.get(key)
    }

    /// Returns the number of shells in the arena.
    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    /// Iterates over all shells.
    pub fn shells(&self) -> impl Iterator<Item = (ShellKey, &ShellData)> {
        self.shells.iter()
    }

    // --- Lump operations ---

    /// Returns the lump data for the given key, or `None` if not found.
    pub fn lump(&self, key: LumpKey) -> Option<&LumpData> {
        self.lumps.get(key)
    }

    /// Returns the number of lumps in the arena.
    pub fn lump_count(&self) -> usize {
        self.lumps.len()
    }

    /// Iterates over all lumps.
    pub fn lumps(&self) -> impl Iterator<Item = (LumpKey, &LumpData)> {
        self.lumps.iter()
    }

    // --- Body operations ---

    /// Returns the body data for the given key, or `None` if not found.
    pub fn body(&self, key: BodyKey) -> Option<&BodyData> {
        self.bodies.get(key)
    }

    /// Returns the number of bodies in the arena.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterates over all bodies.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &BodyData)> {
        self.bodies.iter()
    }

    /// Returns the keys of all bodies, in storage order.
    pub fn body_keys(&self) -> Vec<BodyKey> {
        self.bodies.keys().collect()
    }

    // --- Node existence checks ---

    /// Returns `true` if the given topology key references a live node.
    pub fn contains(&self, key: TopologyKey) -> bool {
        match key {
            TopologyKey::Point(k) => self.points.contains_key(k),
            TopologyKey::Curve(k) => self.curves.contains_key(k),
            TopologyKey::CoEdge(k) => self.coedges.contains_key(k),
            TopologyKey::Loop(k) => self.loops.contains_key(k),
            TopologyKey::Face(k) => self.faces.contains_key(k),
            TopologyKey::Shell(k) => self.shells.contains_key(k),
            TopologyKey::Lump(k) => self.lumps.contains_key(k),
            TopologyKey::Body(k) => self.bodies.contains_key(k),
        }
    }

    // --- Adjacency index helpers ---

    /// Register that a curve uses a point (upward adjacency).
    pub(crate) fn link_point_curve(&mut self, point: PointKey, curve: CurveKey) {
        self.point_to_curves.entry(point).or_default().insert(curve);
    }

    /// Register that a co-edge uses a curve (upward adjacency).
    pub(crate) fn link_curve_coedge(&mut self, curve: CurveKey, coedge: CoEdgeKey) {
        self.curve_to_coedges
            .entry(curve)
            .or_default()
            .insert(coedge);
    }

    /// Register that a face uses a loop (upward adjacency).
    pub(crate) fn link_loop_face(&mut self, lp: LoopKey, face: FaceKey) {
        self.loop_to_faces.entry(lp).or_default().insert(face);
    }

    /// Register that a shell uses a face (upward adjacency).
    pub(crate) fn link_face_shell(&mut self, face: FaceKey, shell: ShellKey) {
        self.face_to_shells.entry(face).or_default().insert(shell);
    }

    /// Register that a lump uses a shell (upward adjacency).
    pub(crate) fn link_shell_lump(&mut self, shell: ShellKey, lump: LumpKey) {
        self.shell_to_lumps.entry(shell).or_default().insert(lump);
    }
}

impl Default for TopologyArena {
    fn default() -> Self {
        Self::new()
    }
}
