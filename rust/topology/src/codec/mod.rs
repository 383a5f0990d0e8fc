// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endian-tagged, versioned binary format for topology graphs.
//!
//! A file is a header followed by eight tables in dependency order:
//!
//! ```text
//! "BREP_TOPOLOGY" | endian marker u32 | format version u32
//! Points | Curves | CoEdges | Loops | Faces | Shells | Lumps | Bodies
//! ```
//!
//! Each table is `{count u32, record × count}` and every record ends with an
//! attribute set. Indices only ever point into tables that were already
//! written, so the reader resolves them as it goes.

mod attrib_block;
mod primitives;
mod read;
mod write;

pub use write::write_tables;

use crate::keys::TopologyType;

/// File type tag at byte 0.
pub const MAGIC: &[u8; 13] = b"BREP_TOPOLOGY";

/// Written in the file's byte order; the reader detects the order from it.
pub const ENDIAN_MARKER: u32 = 0x0102_0304;

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// Current attribute block version.
pub const ATTRIBUTE_BLOCK_VERSION: u32 = 1;

/// Error context naming the table being read or written.
pub(crate) fn table_context(ty: TopologyType) -> &'static str {
    match ty {
        TopologyType::Point => "Point table",
        TopologyType::Curve => "Curve table",
        TopologyType::CoEdge => "CoEdge table",
        TopologyType::Loop => "Loop table",
        TopologyType::Face => "Face table",
        TopologyType::Shell => "Shell table",
        TopologyType::Lump => "Lump table",
        TopologyType::Body => "Body table",
    }
}
