// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Re-parenting, teardown and deep copy of bodies.
//!
//! A node is freed only after its last parent link is gone. Teardown walks
//! children depth first: it removes the back reference to the node being
//! freed, and recurses into a child only when that left the child without
//! parents. Shared sub-graphs therefore survive the deletion of one of their
//! users.

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::tables::TableIndex;

impl TopologyArena {
    /// Hands a free lump to a body.
    pub fn attach_lump(&mut self, body: BodyKey, lump: LumpKey) -> Result<()> {
        if !self.bodies.contains_key(body) {
            return Err(Error::NotFound(body.into()));
        }
        let data = self.lumps.get_mut(lump).ok_or(Error::NotFound(lump.into()))?;
        if data.body.is_some() {
            return Err(Error::LumpAlreadyOwned(lump));
        }
        data.body = Some(body);
        if let Some(b) = self.bodies.get_mut(body) {
            b.lumps.push(lump);
        }
        self.invalidate_bounding_box(body);
        Ok(())
    }

    /// Takes a lump away from its body. The lump stays alive without an
    /// owner until it is attached elsewhere or deleted.
    pub fn detach_lump(&mut self, body: BodyKey, lump: LumpKey) -> Result<()> {
        let data = self.bodies.get_mut(body).ok_or(Error::NotFound(body.into()))?;
        let Some(pos) = data.lumps.iter().position(|&l| l == lump) else {
            return Err(Error::LumpNotInBody { lump, body });
        };
        data.lumps.remove(pos);
        self.invalidate_bounding_box(body);
        if let Some(l) = self.lumps.get_mut(lump) {
            l.body = None;
        }
        Ok(())
    }

    /// Deletes a body and every node that only it kept alive.
    pub fn delete_body(&mut self, body: BodyKey) -> Result<()> {
        let data = self.bodies.remove(body).ok_or(Error::NotFound(body.into()))?;
        for lk in data.lumps {
            if let Some(l) = self.lumps.get_mut(lk) {
                l.body = None;
            }
            self.release(lk.into());
        }
        self.forget_metadata(body.into());
        Ok(())
    }

    /// Deletes a lump that no body holds.
    pub fn delete_lump(&mut self, lump: LumpKey) -> Result<()> {
        let data = self.lumps.get(lump).ok_or(Error::NotFound(lump.into()))?;
        if data.body.is_some() {
            return Err(Error::LumpAlreadyOwned(lump));
        }
        self.release(lump.into());
        Ok(())
    }

    /// Removes nodes created since some point, given in creation order.
    ///
    /// Nodes are removed newest first together with the upward links they
    /// hold on older nodes; older nodes themselves are left alone.
    pub(crate) fn discard(&mut self, created: &[TopologyKey]) {
        for &key in created.iter().rev() {
            for child in self.children(key) {
                self.unlink(child, key);
            }
            self.remove_node(key);
        }
    }

    /// Frees `key` if nothing references it any more, then its children in
    /// turn.
    fn release(&mut self, key: TopologyKey) {
        if self.has_parent(key) {
            return;
        }
        let children = self.children(key);
        for child in &children {
            self.unlink(*child, key);
        }
        self.remove_node(key);
        for child in children {
            self.release(child);
        }
    }

    /// Removes the upward link `child → parent`.
    fn unlink(&mut self, child: TopologyKey, parent: TopologyKey) {
        match (child, parent) {
            (TopologyKey::Point(c), TopologyKey::Curve(p)) => {
                remove_from(&mut self.point_to_curves, c, &p);
            }
            (TopologyKey::Curve(c), TopologyKey::CoEdge(p)) => {
                remove_from(&mut self.curve_to_coedges, c, &p);
            }
            (TopologyKey::CoEdge(c), TopologyKey::Loop(_)) => {
                self.coedge_to_loop.remove(&c);
            }
            (TopologyKey::Loop(c), TopologyKey::Face(p)) => {
                remove_from(&mut self.loop_to_faces, c, &p);
            }
            (TopologyKey::Face(c), TopologyKey::Shell(p)) => {
                remove_from(&mut self.face_to_shells, c, &p);
            }
            (TopologyKey::Shell(c), TopologyKey::Lump(p)) => {
                remove_from(&mut self.shell_to_lumps, c, &p);
            }
            (TopologyKey::Lump(c), TopologyKey::Body(_)) => {
                if let Some(l) = self.lumps.get_mut(c) {
                    l.body = None;
                }
            }
            _ => {}
        }
    }

    fn remove_node(&mut self, key: TopologyKey) {
        match key {
            TopologyKey::Point(k) => {
                self.points.remove(k);
                self.point_to_curves.remove(&k);
            }
            TopologyKey::Curve(k) => {
                self.curves.remove(k);
                self.curve_to_coedges.remove(&k);
            }
            TopologyKey::CoEdge(k) => {
                self.coedges.remove(k);
                self.coedge_to_loop.remove(&k);
            }
            TopologyKey::Loop(k) => {
                self.loops.remove(k);
                self.loop_to_faces.remove(&k);
            }
            TopologyKey::Face(k) => {
                self.faces.remove(k);
                self.face_to_shells.remove(&k);
            }
            TopologyKey::Shell(k) => {
                self.shells.remove(k);
                self.shell_to_lumps.remove(&k);
            }
            TopologyKey::Lump(k) => {
                self.lumps.remove(k);
            }
            TopologyKey::Body(k) => {
                self.bodies.remove(k);
            }
        }
        self.forget_metadata(key);
    }

    /// Deep-copies a body. Sharing inside the body is preserved in the copy;
    /// attribute records and live state are duplicated. The copy keeps the
    /// original's transform.
    pub fn copy_body(&mut self, body: BodyKey) -> Result<BodyKey> {
        let index = TableIndex::for_bodies(self, &[body])?;
        let tables = index.tables(self)?;
        let built = tables.build_into(self)?;

        for (old, new) in index.keys().into_iter().zip(built.keys()) {
            if let Some(&tol) = self.tolerances.get(&old) {
                self.tolerances.insert(new, tol);
            }
            if let Some(name) = self.names.get(&old).cloned() {
                self.names.insert(new, name);
            }
        }

        built
            .bodies
            .first()
            .copied()
            .ok_or(Error::NotFound(body.into()))
    }
}

fn remove_from<K, V>(
    map: &mut rustc_hash::FxHashMap<K, rustc_hash::FxHashSet<V>>,
    key: K,
    value: &V,
) where
    K: std::hash::Hash + Eq,
    V: std::hash::Hash + Eq,
{
    if let Some(set) = map.get_mut(&key) {
        set.remove(value);
        if set.is_empty() {
            map.remove(&key);
        }
    }
}
