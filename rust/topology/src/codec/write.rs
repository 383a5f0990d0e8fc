// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export path: arena → tables → bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::attrib_block::write_attribute_set;
use super::primitives::PrimitiveWriter;
use super::{table_context, ENDIAN_MARKER, FORMAT_VERSION, MAGIC};
use crate::arena::TopologyArena;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::keys::{BodyKey, TopologyType};
use crate::query::TopologyCounts;
use crate::tables::TopologyTables;

impl TopologyArena {
    /// Writes every node of the arena to `out`.
    ///
    /// Returns the number of records written per table.
    pub fn export_to<W: Write>(&self, out: W, config: &CodecConfig) -> Result<TopologyCounts> {
        let tables = TopologyTables::from_arena(self)?;
        write_tables(out, &tables, config)
    }

    /// Writes the given bodies and everything they reach to `out`.
    pub fn export_bodies_to<W: Write>(
        &self,
        bodies: &[BodyKey],
        out: W,
        config: &CodecConfig,
    ) -> Result<TopologyCounts> {
        let tables = TopologyTables::from_bodies(self, bodies)?;
        write_tables(out, &tables, config)
    }

    /// Writes every node of the arena to a file at `path`.
    ///
    /// A failed write leaves a partial file behind; write to a temporary
    /// path and rename on success when that matters.
    pub fn export_to_path(
        &self,
        path: impl AsRef<Path>,
        config: &CodecConfig,
    ) -> Result<TopologyCounts> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.export_to(BufWriter::new(file), config)
    }
}

/// Encodes `tables` with the header, in dependency order.
pub fn write_tables<W: Write>(
    out: W,
    tables: &TopologyTables,
    config: &CodecConfig,
) -> Result<TopologyCounts> {
    let mut w = PrimitiveWriter::new(out, config.byte_order);

    w.write_bytes(MAGIC)?;
    w.write_u32(ENDIAN_MARKER)?;
    w.write_u32(FORMAT_VERSION)?;

    begin_table(&mut w, TopologyType::Point, tables.points.len())?;
    for p in &tables.points {
        w.write_f64(p.x)?;
        w.write_f64(p.y)?;
        w.write_f64(p.z)?;
        write_attribute_set(&mut w, &p.attributes)?;
    }

    begin_table(&mut w, TopologyType::Curve, tables.curves.len())?;
    for c in &tables.curves {
        w.write_u32(c.start)?;
        w.write_u32(c.end)?;
        w.write_i32(c.sense.code())?;
        write_attribute_set(&mut w, &c.attributes)?;
    }

    begin_table(&mut w, TopologyType::CoEdge, tables.coedges.len())?;
    for c in &tables.coedges {
        w.write_u32(c.curve)?;
        w.write_i32(c.sense.code())?;
        write_attribute_set(&mut w, &c.attributes)?;
    }

    begin_table(&mut w, TopologyType::Loop, tables.loops.len())?;
    for l in &tables.loops {
        w.write_indices(&l.coedges)?;
        write_attribute_set(&mut w, &l.attributes)?;
    }

    begin_table(&mut w, TopologyType::Face, tables.faces.len())?;
    for f in &tables.faces {
        w.write_i32(f.sense.code())?;
        w.write_i32(f.shell_sense.code())?;
        w.write_indices(&f.loops)?;
        write_attribute_set(&mut w, &f.attributes)?;
    }

    begin_table(&mut w, TopologyType::Shell, tables.shells.len())?;
    for s in &tables.shells {
        w.write_i32(s.sense.code())?;
        w.write_indices(&s.faces)?;
        write_attribute_set(&mut w, &s.attributes)?;
    }

    begin_table(&mut w, TopologyType::Lump, tables.lumps.len())?;
    for l in &tables.lumps {
        w.write_indices(&l.shells)?;
        write_attribute_set(&mut w, &l.attributes)?;
    }

    begin_table(&mut w, TopologyType::Body, tables.bodies.len())?;
    for b in &tables.bodies {
        w.write_indices(&b.lumps)?;
        w.write_u32(4)?;
        w.write_u32(4)?;
        for row in &b.transform {
            for &value in row {
                w.write_f64(value)?;
            }
        }
        write_attribute_set(&mut w, &b.attributes)?;
    }

    w.flush()?;

    let counts = tables.counts();
    tracing::info!(
        bytes = w.offset(),
        nodes = counts.total(),
        bodies = counts.bodies,
        "Exported topology"
    );
    Ok(counts)
}

fn begin_table<W: Write>(w: &mut PrimitiveWriter<W>, ty: TopologyType, len: usize) -> Result<()> {
    w.set_context(table_context(ty));
    tracing::debug!(table = %ty, records = len, offset = w.offset(), "Writing table");
    w.write_len(len)
}
