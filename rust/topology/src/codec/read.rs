// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import path: bytes → arena.
//!
//! Records are pushed into a [`TableBuilder`] as soon as they are decoded,
//! so every index is checked against the tables read so far. Any failure
//! discards the partially built arena.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nalgebra::Matrix4;

use super::attrib_block::read_attribute_set;
use super::primitives::PrimitiveReader;
use super::{table_context, ENDIAN_MARKER, FORMAT_VERSION, MAGIC};
use crate::arena::{Sense, TopologyArena};
use crate::config::{ByteOrder, CodecConfig};
use crate::error::{Error, Result};
use crate::keys::TopologyType;
use crate::tables::TableBuilder;

impl TopologyArena {
    /// Reads a graph written by [`TopologyArena::export_to`].
    ///
    /// The byte order comes from the file; `config` only bounds counts.
    pub fn import_from<R: Read>(input: R, config: &CodecConfig) -> Result<TopologyArena> {
        let mut r = PrimitiveReader::new(input, config.max_table_len);
        read_header(&mut r)?;

        let mut arena = TopologyArena::new();
        read_tables(&mut r, &mut arena)?;

        let counts = arena.counts();
        tracing::info!(
            bytes = r.offset(),
            nodes = counts.total(),
            bodies = counts.bodies,
            "Imported topology"
        );
        Ok(arena)
    }

    /// Reads a graph from a file at `path`.
    pub fn import_from_path(path: impl AsRef<Path>, config: &CodecConfig) -> Result<TopologyArena> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::import_from(BufReader::new(file), config)
    }
}

fn read_header<R: Read>(r: &mut PrimitiveReader<R>) -> Result<()> {
    let magic = r.read_array::<13>()?;
    if &magic != MAGIC {
        return Err(r.corrupt_at(0, "not a topology file (bad magic)"));
    }

    let marker_at = r.offset();
    let marker = r.read_array::<4>()?;
    let order = if u32::from_le_bytes(marker) == ENDIAN_MARKER {
        ByteOrder::Little
    } else if u32::from_be_bytes(marker) == ENDIAN_MARKER {
        ByteOrder::Big
    } else {
        return Err(r.corrupt_at(marker_at, format!("unknown endian marker {marker:02x?}")));
    };
    r.set_order(order);

    let version_at = r.offset();
    let version = r.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(Error::VersionMismatch {
            block: "file header",
            found: version,
            expected: FORMAT_VERSION,
            offset: version_at,
        });
    }
    tracing::debug!(?order, version, "Read topology header");
    Ok(())
}

fn begin_table<R: Read>(r: &mut PrimitiveReader<R>, ty: TopologyType) -> Result<usize> {
    r.set_context(table_context(ty));
    let at = r.offset();
    let count = r.read_count()?;
    tracing::debug!(table = %ty, records = count, offset = at, "Reading table");
    Ok(count)
}

fn read_sense<R: Read>(r: &mut PrimitiveReader<R>) -> Result<Sense> {
    let at = r.offset();
    let code = r.read_i32()?;
    Sense::from_code(code).ok_or_else(|| r.corrupt_at(at, format!("invalid sense code {code}")))
}

/// Builder rejections other than bad indices still mean the bytes are bad;
/// report them with the position of the offending record.
fn structural<R: Read>(r: &PrimitiveReader<R>, record_at: u64, err: Error) -> Error {
    match err {
        e @ Error::CorruptIndex { .. } => e,
        other => r.corrupt_at(record_at, other.to_string()),
    }
}

fn read_tables<R: Read>(r: &mut PrimitiveReader<R>, arena: &mut TopologyArena) -> Result<()> {
    let mut builder = TableBuilder::new(arena);

    for _ in 0..begin_table(r, TopologyType::Point)? {
        let x = r.read_f64()?;
        let y = r.read_f64()?;
        let z = r.read_f64()?;
        let attributes = read_attribute_set(r)?;
        builder.push_point(x, y, z, attributes);
    }

    for _ in 0..begin_table(r, TopologyType::Curve)? {
        let at = r.offset();
        let start = r.read_u32()?;
        let end = r.read_u32()?;
        let sense = read_sense(r)?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_curve(start, end, sense, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::CoEdge)? {
        let at = r.offset();
        let curve = r.read_u32()?;
        let sense = read_sense(r)?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_coedge(curve, sense, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::Loop)? {
        let at = r.offset();
        let coedges = r.read_indices()?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_loop(&coedges, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::Face)? {
        let at = r.offset();
        let sense = read_sense(r)?;
        let shell_sense = read_sense(r)?;
        let loops = r.read_indices()?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_face(sense, shell_sense, &loops, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::Shell)? {
        let at = r.offset();
        let sense = read_sense(r)?;
        let faces = r.read_indices()?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_shell(sense, &faces, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::Lump)? {
        let at = r.offset();
        let shells = r.read_indices()?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_lump(&shells, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    for _ in 0..begin_table(r, TopologyType::Body)? {
        let at = r.offset();
        let lumps = r.read_indices()?;
        let transform = read_matrix(r)?;
        let attributes = read_attribute_set(r)?;
        builder
            .push_body(&lumps, transform, attributes)
            .map_err(|e| structural(r, at, e))?;
    }

    builder.finish();
    Ok(())
}

fn read_matrix<R: Read>(r: &mut PrimitiveReader<R>) -> Result<Matrix4<f64>> {
    let at = r.offset();
    let rows = r.read_u32()?;
    let cols = r.read_u32()?;
    if (rows, cols) != (4, 4) {
        return Err(r.corrupt_at(at, format!("body transform is {rows}x{cols}, expected 4x4")));
    }
    let mut m = Matrix4::zeros();
    for row in 0..4 {
        for col in 0..4 {
            m[(row, col)] = r.read_f64()?;
        }
    }
    Ok(m)
}
