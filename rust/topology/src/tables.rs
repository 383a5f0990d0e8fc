// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flattened, dependency-ordered tables of a topology graph.
//!
//! Export walks the arena and assigns every node a sequential index within
//! its kind; cross-references become indices into tables that come earlier
//! in [`TopologyType::ALL`] order. Import goes the other way through
//! [`TableBuilder`], which resolves every index as soon as its record is
//! pushed, so a reference can only ever point backwards.
//!
//! The binary codec, the JSON snapshot and [`TopologyArena::copy_body`] all
//! go through this module.

use nalgebra::Matrix4;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::{Sense, TopologyArena};
use crate::attributes::AttributeRecord;
use crate::codec::table_context;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::query::TopologyCounts;

/// A point row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A curve row; `start`/`end` index the point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveEntry {
    pub start: u32,
    pub end: u32,
    pub sense: Sense,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A co-edge row; `curve` indexes the curve table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoEdgeEntry {
    pub curve: u32,
    pub sense: Sense,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A loop row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopEntry {
    pub coedges: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A face row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEntry {
    pub sense: Sense,
    pub shell_sense: Sense,
    pub loops: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A shell row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellEntry {
    pub sense: Sense,
    pub faces: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A lump row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpEntry {
    pub shells: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

/// A body row. The transform is stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyEntry {
    pub lumps: Vec<u32>,
    pub transform: [[f64; 4]; 4],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRecord>,
}

impl BodyEntry {
    /// Returns the transform as a matrix.
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_fn(|r, c| self.transform[r][c])
    }
}

pub(crate) fn rows_of(m: &Matrix4<f64>) -> [[f64; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = m[(r, c)];
        }
    }
    rows
}

/// All eight tables of a graph, leaves first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyTables {
    pub points: Vec<PointEntry>,
    pub curves: Vec<CurveEntry>,
    pub coedges: Vec<CoEdgeEntry>,
    pub loops: Vec<LoopEntry>,
    pub faces: Vec<FaceEntry>,
    pub shells: Vec<ShellEntry>,
    pub lumps: Vec<LumpEntry>,
    pub bodies: Vec<BodyEntry>,
}

impl TopologyTables {
    /// Flattens every node of the arena.
    pub fn from_arena(arena: &TopologyArena) -> Result<Self> {
        TableIndex::whole(arena)?.tables(arena)
    }

    /// Flattens the given bodies and everything reachable from them.
    pub fn from_bodies(arena: &TopologyArena, bodies: &[BodyKey]) -> Result<Self> {
        TableIndex::for_bodies(arena, bodies)?.tables(arena)
    }

    /// Row counts per table.
    pub fn counts(&self) -> TopologyCounts {
        TopologyCounts {
            points: self.points.len(),
            curves: self.curves.len(),
            coedges: self.coedges.len(),
            loops: self.loops.len(),
            faces: self.faces.len(),
            shells: self.shells.len(),
            lumps: self.lumps.len(),
            bodies: self.bodies.len(),
        }
    }

    /// Materializes the tables as new nodes of `arena`.
    pub fn build_into(&self, arena: &mut TopologyArena) -> Result<BuiltKeys> {
        let mut builder = TableBuilder::new(arena);
        for p in &self.points {
            builder.push_point(p.x, p.y, p.z, p.attributes.clone());
        }
        for c in &self.curves {
            builder.push_curve(c.start, c.end, c.sense, c.attributes.clone())?;
        }
        for c in &self.coedges {
            builder.push_coedge(c.curve, c.sense, c.attributes.clone())?;
        }
        for l in &self.loops {
            builder.push_loop(&l.coedges, l.attributes.clone())?;
        }
        for f in &self.faces {
            builder.push_face(f.sense, f.shell_sense, &f.loops, f.attributes.clone())?;
        }
        for s in &self.shells {
            builder.push_shell(s.sense, &s.faces, s.attributes.clone())?;
        }
        for l in &self.lumps {
            builder.push_lump(&l.shells, l.attributes.clone())?;
        }
        for b in &self.bodies {
            builder.push_body(&b.lumps, b.matrix(), b.attributes.clone())?;
        }
        Ok(builder.finish())
    }

    /// Builds a fresh arena from the tables.
    pub fn to_arena(&self) -> Result<TopologyArena> {
        let mut arena = TopologyArena::new();
        self.build_into(&mut arena)?;
        Ok(arena)
    }
}

// =============================================================================
// Export: key → index assignment
// =============================================================================

/// Ordered key list plus reverse index for one node kind.
#[derive(Debug)]
pub(crate) struct KeyTable<K: slotmap::Key> {
    pub(crate) keys: Vec<K>,
    index: FxHashMap<K, u32>,
    ty: TopologyType,
}

impl<K: slotmap::Key + Into<TopologyKey>> KeyTable<K> {
    fn new(ty: TopologyType) -> Self {
        Self {
            keys: Vec::new(),
            index: FxHashMap::default(),
            ty,
        }
    }

    /// Adds `key` if unseen. Returns `true` when it was new.
    fn insert(&mut self, key: K) -> Result<bool> {
        if self.index.contains_key(&key) {
            return Ok(false);
        }
        let next = next_index(self.ty, self.keys.len())?;
        self.index.insert(key, next);
        self.keys.push(key);
        Ok(true)
    }

    fn get(&self, key: K) -> Result<u32> {
        self.index
            .get(&key)
            .copied()
            .ok_or_else(|| Error::NotFound(key.into()))
    }

    fn map(&self, keys: &[K]) -> Result<Vec<u32>> {
        keys.iter().map(|&k| self.get(k)).collect()
    }
}

/// Index the next record of a table gets; tables are capped at 32-bit
/// indices.
fn next_index(ty: TopologyType, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Corrupt {
        context: table_context(ty).to_string(),
        offset: 0,
        reason: format!("count {len} does not fit in 32 bits"),
    })
}

/// Index assignment for one export, per node kind in table order.
#[derive(Debug)]
pub(crate) struct TableIndex {
    pub(crate) points: KeyTable<PointKey>,
    pub(crate) curves: KeyTable<CurveKey>,
    pub(crate) coedges: KeyTable<CoEdgeKey>,
    pub(crate) loops: KeyTable<LoopKey>,
    pub(crate) faces: KeyTable<FaceKey>,
    pub(crate) shells: KeyTable<ShellKey>,
    pub(crate) lumps: KeyTable<LumpKey>,
    pub(crate) bodies: KeyTable<BodyKey>,
}

impl TableIndex {
    fn empty() -> Self {
        Self {
            points: KeyTable::new(TopologyType::Point),
            curves: KeyTable::new(TopologyType::Curve),
            coedges: KeyTable::new(TopologyType::CoEdge),
            loops: KeyTable::new(TopologyType::Loop),
            faces: KeyTable::new(TopologyType::Face),
            shells: KeyTable::new(TopologyType::Shell),
            lumps: KeyTable::new(TopologyType::Lump),
            bodies: KeyTable::new(TopologyType::Body),
        }
    }

    /// Every node, in storage order.
    pub(crate) fn whole(arena: &TopologyArena) -> Result<Self> {
        let mut index = Self::empty();
        for k in arena.points.keys() {
            index.points.insert(k)?;
        }
        for k in arena.curves.keys() {
            index.curves.insert(k)?;
        }
        for k in arena.coedges.keys() {
            index.coedges.insert(k)?;
        }
        for k in arena.loops.keys() {
            index.loops.insert(k)?;
        }
        for k in arena.faces.keys() {
            index.faces.insert(k)?;
        }
        for k in arena.shells.keys() {
            index.shells.insert(k)?;
        }
        for k in arena.lumps.keys() {
            index.lumps.insert(k)?;
        }
        for k in arena.bodies.keys() {
            index.bodies.insert(k)?;
        }
        Ok(index)
    }

    /// The given bodies and their descendants, each kind in first-seen
    /// order of a depth-first walk.
    pub(crate) fn for_bodies(arena: &TopologyArena, bodies: &[BodyKey]) -> Result<Self> {
        let mut index = Self::empty();
        for &bk in bodies {
            let body = arena.bodies.get(bk).ok_or(Error::NotFound(bk.into()))?;
            if !index.bodies.insert(bk)? {
                continue;
            }
            for &lk in &body.lumps {
                index.visit_lump(arena, lk)?;
            }
        }
        Ok(index)
    }

    fn visit_lump(&mut self, arena: &TopologyArena, key: LumpKey) -> Result<()> {
        if !self.lumps.insert(key)? {
            return Ok(());
        }
        let lump = arena.lumps.get(key).ok_or(Error::NotFound(key.into()))?;
        for &sk in &lump.shells {
            if !self.shells.insert(sk)? {
                continue;
            }
            let shell = arena.shells.get(sk).ok_or(Error::NotFound(sk.into()))?;
            for &fk in &shell.faces {
                self.visit_face(arena, fk)?;
            }
        }
        Ok(())
    }

    fn visit_face(&mut self, arena: &TopologyArena, key: FaceKey) -> Result<()> {
        if !self.faces.insert(key)? {
            return Ok(());
        }
        let face = arena.faces.get(key).ok_or(Error::NotFound(key.into()))?;
        for &lk in &face.loops {
            if !self.loops.insert(lk)? {
                continue;
            }
            let lp = arena.loops.get(lk).ok_or(Error::NotFound(lk.into()))?;
            for &ck in &lp.coedges {
                if !self.coedges.insert(ck)? {
                    continue;
                }
                let coedge = arena.coedges.get(ck).ok_or(Error::NotFound(ck.into()))?;
                if self.curves.insert(coedge.curve)? {
                    let curve = arena
                        .curves
                        .get(coedge.curve)
                        .ok_or(Error::NotFound(coedge.curve.into()))?;
                    self.points.insert(curve.start)?;
                    self.points.insert(curve.end)?;
                }
            }
        }
        Ok(())
    }

    /// Every indexed key, in table order.
    pub(crate) fn keys(&self) -> Vec<TopologyKey> {
        let mut out = Vec::new();
        out.extend(self.points.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.curves.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.coedges.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.loops.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.faces.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.shells.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.lumps.keys.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.bodies.keys.iter().map(|&k| TopologyKey::from(k)));
        out
    }

    /// Renders the indexed nodes as tables.
    pub(crate) fn tables(&self, arena: &TopologyArena) -> Result<TopologyTables> {
        let attrs = |key: TopologyKey| arena.attributes_of(key).to_vec();
        let mut out = TopologyTables::default();

        for &k in &self.points.keys {
            let p = arena.points.get(k).ok_or(Error::NotFound(k.into()))?;
            out.points.push(PointEntry {
                x: p.x,
                y: p.y,
                z: p.z,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.curves.keys {
            let c = arena.curves.get(k).ok_or(Error::NotFound(k.into()))?;
            out.curves.push(CurveEntry {
                start: self.points.get(c.start)?,
                end: self.points.get(c.end)?,
                sense: c.sense,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.coedges.keys {
            let c = arena.coedges.get(k).ok_or(Error::NotFound(k.into()))?;
            out.coedges.push(CoEdgeEntry {
                curve: self.curves.get(c.curve)?,
                sense: c.sense,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.loops.keys {
            let l = arena.loops.get(k).ok_or(Error::NotFound(k.into()))?;
            out.loops.push(LoopEntry {
                coedges: self.coedges.map(&l.coedges)?,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.faces.keys {
            let f = arena.faces.get(k).ok_or(Error::NotFound(k.into()))?;
            out.faces.push(FaceEntry {
                sense: f.sense,
                shell_sense: f.shell_sense,
                loops: self.loops.map(&f.loops)?,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.shells.keys {
            let s = arena.shells.get(k).ok_or(Error::NotFound(k.into()))?;
            out.shells.push(ShellEntry {
                sense: s.sense,
                faces: self.faces.map(&s.faces)?,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.lumps.keys {
            let l = arena.lumps.get(k).ok_or(Error::NotFound(k.into()))?;
            out.lumps.push(LumpEntry {
                shells: self.shells.map(&l.shells)?,
                attributes: attrs(k.into()),
            });
        }
        for &k in &self.bodies.keys {
            let b = arena.bodies.get(k).ok_or(Error::NotFound(k.into()))?;
            out.bodies.push(BodyEntry {
                lumps: self.lumps.map(&b.lumps)?,
                transform: rows_of(&b.transform),
                attributes: attrs(k.into()),
            });
        }
        Ok(out)
    }
}

// =============================================================================
// Import: index → key resolution
// =============================================================================

/// Keys created by one import, indexed like the tables they came from.
#[derive(Debug, Clone, Default)]
pub struct BuiltKeys {
    pub points: Vec<PointKey>,
    pub curves: Vec<CurveKey>,
    pub coedges: Vec<CoEdgeKey>,
    pub loops: Vec<LoopKey>,
    pub faces: Vec<FaceKey>,
    pub shells: Vec<ShellKey>,
    pub lumps: Vec<LumpKey>,
    pub bodies: Vec<BodyKey>,
}

impl BuiltKeys {
    /// Every created key, in table order.
    pub fn keys(&self) -> Vec<TopologyKey> {
        let mut out = Vec::new();
        out.extend(self.points.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.curves.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.coedges.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.loops.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.faces.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.shells.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.lumps.iter().map(|&k| TopologyKey::from(k)));
        out.extend(self.bodies.iter().map(|&k| TopologyKey::from(k)));
        out
    }
}

fn resolve<K: Copy>(table: &[K], entity: TopologyType, record: usize, index: u32) -> Result<K> {
    table
        .get(index as usize)
        .copied()
        .ok_or(Error::CorruptIndex {
            entity,
            record,
            index,
            bound: table.len(),
        })
}

fn resolve_all<K: Copy>(
    table: &[K],
    entity: TopologyType,
    record: usize,
    indices: &[u32],
) -> Result<Vec<K>> {
    indices
        .iter()
        .map(|&i| resolve(table, entity, record, i))
        .collect()
}

/// Rebuilds nodes record by record, resolving indices immediately.
pub(crate) struct TableBuilder<'a> {
    arena: &'a mut TopologyArena,
    keys: BuiltKeys,
}

impl<'a> TableBuilder<'a> {
    pub(crate) fn new(arena: &'a mut TopologyArena) -> Self {
        Self {
            arena,
            keys: BuiltKeys::default(),
        }
    }

    fn set_attributes(&mut self, key: TopologyKey, attributes: Vec<AttributeRecord>) {
        if !attributes.is_empty() {
            self.arena.attributes.insert(key, attributes);
        }
    }

    pub(crate) fn push_point(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        attributes: Vec<AttributeRecord>,
    ) -> PointKey {
        let key = self.arena.add_point(x, y, z);
        self.set_attributes(key.into(), attributes);
        self.keys.points.push(key);
        key
    }

    pub(crate) fn push_curve(
        &mut self,
        start: u32,
        end: u32,
        sense: Sense,
        attributes: Vec<AttributeRecord>,
    ) -> Result<CurveKey> {
        let record = self.keys.curves.len();
        let start = resolve(&self.keys.points, TopologyType::Curve, record, start)?;
        let end = resolve(&self.keys.points, TopologyType::Curve, record, end)?;
        let key = self.arena.add_curve_with_sense(start, end, sense)?;
        self.set_attributes(key.into(), attributes);
        self.keys.curves.push(key);
        Ok(key)
    }

    pub(crate) fn push_coedge(
        &mut self,
        curve: u32,
        sense: Sense,
        attributes: Vec<AttributeRecord>,
    ) -> Result<CoEdgeKey> {
        let record = self.keys.coedges.len();
        let curve = resolve(&self.keys.curves, TopologyType::CoEdge, record, curve)?;
        let key = self.arena.add_coedge(curve, sense)?;
        self.set_attributes(key.into(), attributes);
        self.keys.coedges.push(key);
        Ok(key)
    }

    pub(crate) fn push_loop(
        &mut self,
        coedges: &[u32],
        attributes: Vec<AttributeRecord>,
    ) -> Result<LoopKey> {
        let record = self.keys.loops.len();
        let coedges = resolve_all(&self.keys.coedges, TopologyType::Loop, record, coedges)?;
        let key = self.arena.add_loop(&coedges)?;
        self.set_attributes(key.into(), attributes);
        self.keys.loops.push(key);
        Ok(key)
    }

    pub(crate) fn push_face(
        &mut self,
        sense: Sense,
        shell_sense: Sense,
        loops: &[u32],
        attributes: Vec<AttributeRecord>,
    ) -> Result<FaceKey> {
        let record = self.keys.faces.len();
        let loops = resolve_all(&self.keys.loops, TopologyType::Face, record, loops)?;
        let key = self.arena.add_face_with_senses(&loops, sense, shell_sense)?;
        self.set_attributes(key.into(), attributes);
        self.keys.faces.push(key);
        Ok(key)
    }

    pub(crate) fn push_shell(
        &mut self,
        sense: Sense,
        faces: &[u32],
        attributes: Vec<AttributeRecord>,
    ) -> Result<ShellKey> {
        let record = self.keys.shells.len();
        let faces = resolve_all(&self.keys.faces, TopologyType::Shell, record, faces)?;
        let key = self.arena.add_shell_with_sense(&faces, sense)?;
        self.set_attributes(key.into(), attributes);
        self.keys.shells.push(key);
        Ok(key)
    }

    pub(crate) fn push_lump(
        &mut self,
        shells: &[u32],
        attributes: Vec<AttributeRecord>,
    ) -> Result<LumpKey> {
        let record = self.keys.lumps.len();
        let shells = resolve_all(&self.keys.shells, TopologyType::Lump, record, shells)?;
        let key = self.arena.add_lump(&shells)?;
        self.set_attributes(key.into(), attributes);
        self.keys.lumps.push(key);
        Ok(key)
    }

    pub(crate) fn push_body(
        &mut self,
        lumps: &[u32],
        transform: Matrix4<f64>,
        attributes: Vec<AttributeRecord>,
    ) -> Result<BodyKey> {
        let record = self.keys.bodies.len();
        let lumps = resolve_all(&self.keys.lumps, TopologyType::Body, record, lumps)?;
        let key = self.arena.add_body_with_transform(&lumps, transform)?;
        self.set_attributes(key.into(), attributes);
        self.keys.bodies.push(key);
        Ok(key)
    }

    pub(crate) fn finish(self) -> BuiltKeys {
        self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::make_polygon_face;

    fn triangle_body(arena: &mut TopologyArena) -> BodyKey {
        let pts = [
            arena.add_point(0.0, 0.0, 0.0),
            arena.add_point(1.0, 0.0, 0.0),
            arena.add_point(0.0, 1.0, 0.0),
        ];
        let (face, _, _) = make_polygon_face(arena, &pts).unwrap();
        let shell = arena.add_shell(&[face]).unwrap();
        let lump = arena.add_lump(&[shell]).unwrap();
        arena.add_body(&[lump]).unwrap()
    }

    fn two_bodies(arena: &mut TopologyArena) -> (BodyKey, BodyKey) {
        (triangle_body(arena), triangle_body(arena))
    }

    #[test]
    fn whole_arena_tables_reference_backwards() {
        let mut arena = TopologyArena::new();
        two_bodies(&mut arena);
        let tables = TopologyTables::from_arena(&arena).unwrap();

        assert_eq!(tables.counts(), arena.counts());
        for c in &tables.curves {
            assert!((c.start as usize) < tables.points.len());
            assert!((c.end as usize) < tables.points.len());
        }
        for l in &tables.loops {
            assert!(l.coedges.iter().all(|&i| (i as usize) < tables.coedges.len()));
        }
    }

    #[test]
    fn selected_body_only() {
        let mut arena = TopologyArena::new();
        let (_, b) = two_bodies(&mut arena);
        let tables = TopologyTables::from_bodies(&arena, &[b]).unwrap();

        let counts = tables.counts();
        assert_eq!(counts.bodies, 1);
        assert_eq!(counts.points, 3);
        assert_eq!(counts.coedges, 3);
    }

    #[test]
    fn rebuild_preserves_counts_and_attributes() {
        let mut arena = TopologyArena::new();
        let (a, _) = two_bodies(&mut arena);
        arena
            .attach(a.into(), AttributeRecord::new("LABEL").with_string("first"))
            .unwrap();

        let tables = TopologyTables::from_arena(&arena).unwrap();
        let rebuilt = tables.to_arena().unwrap();

        assert_eq!(rebuilt.counts(), arena.counts());
        let labelled: Vec<_> = rebuilt
            .body_keys()
            .into_iter()
            .filter(|&b| !rebuilt.query(b.into(), Some("LABEL")).is_empty())
            .collect();
        assert_eq!(labelled.len(), 1);
        assert_eq!(TopologyTables::from_arena(&rebuilt).unwrap(), tables);
    }

    #[test]
    fn forward_reference_is_corrupt_index() {
        let tables = TopologyTables {
            points: vec![PointEntry {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                attributes: Vec::new(),
            }],
            curves: vec![CurveEntry {
                start: 0,
                end: 3,
                sense: Sense::Forward,
                attributes: Vec::new(),
            }],
            ..TopologyTables::default()
        };

        let err = tables.to_arena().unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptIndex {
                entity: TopologyType::Curve,
                record: 0,
                index: 3,
                bound: 1,
            }
        ));
    }

    #[test]
    fn body_matrix_rows_roundtrip() {
        let m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 0.0, 0.0, 0.0, 1.0,
        );
        let entry = BodyEntry {
            lumps: Vec::new(),
            transform: rows_of(&m),
            attributes: Vec::new(),
        };
        assert_eq!(entry.transform[0], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(entry.matrix(), m);
    }

    #[test]
    fn index_past_u32_range_is_refused() {
        assert_eq!(next_index(TopologyType::Point, 7).unwrap(), 7);
        assert_eq!(
            next_index(TopologyType::Point, u32::MAX as usize).unwrap(),
            u32::MAX
        );

        #[cfg(target_pointer_width = "64")]
        {
            let err = next_index(TopologyType::Curve, u32::MAX as usize + 1).unwrap_err();
            assert!(matches!(err, Error::Corrupt { .. }));
            assert!(err.to_string().contains("Curve table"));
        }
    }
}
