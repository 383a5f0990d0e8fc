// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BRep-Lite Topology
//!
//! Boundary-representation topology graph built over an external geometry
//! kernel.
//!
//! Nodes (points, curves, co-edges, loops, faces, shells, lumps, bodies) are
//! stored in slot maps with upward adjacency indices. Sub-shapes shared in
//! the kernel's model stay shared in the graph: an [`ImportSession`] keeps a
//! [`ShapeRegistry`] from native identities to nodes, and edges used in both
//! directions resolve to one curve with one co-edge per use.
//!
//! Nodes carry generic [`AttributeRecord`]s; [`TypedAttribute`] layers a
//! construct / actuate / update lifecycle over them with per-kind merge and
//! split policies. Graphs are persisted with a versioned, endian-tagged
//! binary format whose tables are written leaves first, so every reference
//! in a file points backwards.
//!
//! ## Example
//!
//! ```
//! use brep_lite_topology::{CodecConfig, ImportSession, ShapeTree, TopologyArena};
//!
//! let mut tree = ShapeTree::new();
//! let a = tree.vertex(0.0, 0.0, 0.0);
//! let b = tree.vertex(1.0, 0.0, 0.0);
//! let c = tree.vertex(0.0, 1.0, 0.0);
//! let ab = tree.edge(a, b);
//! let bc = tree.edge(b, c);
//! let ca = tree.edge(c, a);
//! let wire = tree.wire(&[ab, bc, ca]);
//! let face = tree.face(&[wire]);
//! let shell = tree.shell(&[face]);
//! let solid = tree.solid(&[shell]);
//!
//! let mut session = ImportSession::new(&tree);
//! let body = session.import_body(&solid).unwrap();
//! let arena = session.finish().unwrap();
//! assert_eq!(arena.counts().curves, 3);
//!
//! let mut bytes = Vec::new();
//! arena.export_to(&mut bytes, &CodecConfig::default()).unwrap();
//! let back = TopologyArena::import_from(bytes.as_slice(), &CodecConfig::default()).unwrap();
//! assert_eq!(back.counts(), arena.counts());
//! # let _ = body;
//! ```

pub mod arena;
pub mod attribute_kinds;
pub mod attributes;
pub mod codec;
pub mod config;
pub mod construction;
pub mod error;
pub mod kernel;
pub mod keys;
pub mod lifecycle;
pub mod query;
pub mod registry;
pub mod serialization;
pub mod session;
pub mod shape_tree;
pub mod tables;
pub mod teardown;
pub mod transform;
pub mod traversal;

pub use arena::{Sense, TopologyArena};
pub use attribute_kinds::{EntityName, EntityTolerance};
pub use attributes::AttributeRecord;
pub use config::{ByteOrder, CodecConfig};
pub use error::{Error, ErrorCategory, Result};
pub use kernel::{Orientation, ShapeKernel, ShapeKind};
pub use keys::{
    BodyKey, CoEdgeKey, CurveKey, FaceKey, LoopKey, LumpKey, PointKey, ShellKey, TopologyKey,
    TopologyType,
};
pub use lifecycle::{AttributeKind, LifecycleState, TypedAttribute};
pub use query::TopologyCounts;
pub use registry::ShapeRegistry;
pub use session::ImportSession;
pub use shape_tree::{ShapeId, ShapeRef, ShapeTree};
pub use tables::TopologyTables;
pub use transform::BoundingBox;
