// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for topology nodes.
//!
//! Each node is created through the arena, which ensures referential
//! integrity (all referenced children must exist) and maintains the
//! bidirectional adjacency index.
//!
//! The public `add_*` methods take complete child lists and validate them.
//! Import construction needs the opposite order (register a node, then
//! populate it), so the crate also has `new_*`/`push_*` pairs that create an
//! empty container and append children one by one. Emptiness of those
//! containers is checked once construction finishes.

use nalgebra::Matrix4;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl TopologyArena {
    /// Creates a curve between two existing points, forward relative to its
    /// geometry. `start == end` describes a closed curve.
    pub fn add_curve(&mut self, start: PointKey, end: PointKey) -> Result<CurveKey> {
        self.add_curve_with_sense(start, end, Sense::Forward)
    }

    /// Creates a curve with an explicit sense.
    pub fn add_curve_with_sense(
        &mut self,
        start: PointKey,
        end: PointKey,
        sense: Sense,
    ) -> Result<CurveKey> {
        for p in [start, end] {
            if !self.points.contains_key(p) {
                return Err(Error::NotFound(p.into()));
            }
        }

        let key = self.curves.insert(CurveData { start, end, sense });
        self.link_point_curve(start, key);
        self.link_point_curve(end, key);
        Ok(key)
    }

    /// Creates a co-edge, one oriented use of `curve`.
    pub fn add_coedge(&mut self, curve: CurveKey, sense: Sense) -> Result<CoEdgeKey> {
        if !self.curves.contains_key(curve) {
            return Err(Error::NotFound(curve.into()));
        }

        let key = self.coedges.insert(CoEdgeData { curve, sense });
        self.link_curve_coedge(curve, key);
        Ok(key)
    }

    /// Creates a loop from co-edges in cyclic order.
    ///
    /// Each co-edge must be free: a co-edge is a single use and joins
    /// exactly one loop.
    pub fn add_loop(&mut self, coedges: &[CoEdgeKey]) -> Result<LoopKey> {
        if coedges.is_empty() {
            return Err(Error::EmptyLoop);
        }
        for (i, &ck) in coedges.iter().enumerate() {
            if !self.coedges.contains_key(ck) {
                return Err(Error::NotFound(ck.into()));
            }
            if self.coedge_to_loop.contains_key(&ck) || coedges[..i].contains(&ck) {
                return Err(Error::CoEdgeInUse(ck));
            }
        }

        let key = self.new_loop();
        for &ck in coedges {
            self.push_coedge(key, ck)?;
        }
        Ok(key)
    }

    /// Creates a face from its loops; the first loop is the outer boundary.
    pub fn add_face(&mut self, loops: &[LoopKey]) -> Result<FaceKey> {
        self.add_face_with_senses(loops, Sense::Forward, Sense::Forward)
    }

    /// Creates a face with explicit surface and shell senses.
    pub fn add_face_with_senses(
        &mut self,
        loops: &[LoopKey],
        sense: Sense,
        shell_sense: Sense,
    ) -> Result<FaceKey> {
        if loops.is_empty() {
            return Err(Error::FaceWithoutLoops);
        }
        for &lk in loops {
            if !self.loops.contains_key(lk) {
                return Err(Error::NotFound(lk.into()));
            }
        }

        let key = self.new_face(sense, shell_sense);
        for &lk in loops {
            self.push_loop(key, lk)?;
        }
        Ok(key)
    }

    /// Creates a shell from a list of faces.
    pub fn add_shell(&mut self, faces: &[FaceKey]) -> Result<ShellKey> {
        self.add_shell_with_sense(faces, Sense::Forward)
    }

    /// Creates a shell with an explicit sense relative to its lump.
    pub fn add_shell_with_sense(&mut self, faces: &[FaceKey], sense: Sense) -> Result<ShellKey> {
        if faces.is_empty() {
            return Err(Error::EmptyShell);
        }
        for &fk in faces {
            if !self.faces.contains_key(fk) {
                return Err(Error::NotFound(fk.into()));
            }
        }

        let key = self.new_shell(sense);
        for &fk in faces {
            self.push_face(key, fk)?;
        }
        Ok(key)
    }

    /// Creates a lump from its shells; the first shell is the outer one.
    pub fn add_lump(&mut self, shells: &[ShellKey]) -> Result<LumpKey> {
        if shells.is_empty() {
            return Err(Error::EmptyLump);
        }
        for &sk in shells {
            if !self.shells.contains_key(sk) {
                return Err(Error::NotFound(sk.into()));
            }
        }

        let key = self.new_lump();
        for &sk in shells {
            self.push_shell(key, sk)?;
        }
        Ok(key)
    }

    /// Creates a body owning the given lumps, with an identity transform.
    pub fn add_body(&mut self, lumps: &[LumpKey]) -> Result<BodyKey> {
        self.add_body_with_transform(lumps, Matrix4::identity())
    }

    /// Creates a body owning the given lumps with a stored transform.
    ///
    /// Every lump must exist and must not belong to another body.
    pub fn add_body_with_transform(
        &mut self,
        lumps: &[LumpKey],
        transform: Matrix4<f64>,
    ) -> Result<BodyKey> {
        for &lk in lumps {
            let lump = self.lumps.get(lk).ok_or(Error::NotFound(lk.into()))?;
            if lump.body.is_some() {
                return Err(Error::LumpAlreadyOwned(lk));
            }
        }

        let key = self.new_body();
        if let Some(body) = self.bodies.get_mut(key) {
            body.transform = transform;
        }
        for &lk in lumps {
            self.attach_lump(key, lk)?;
        }
        Ok(key)
    }

    // --- Create-then-populate primitives ---

    pub(crate) fn new_loop(&mut self) -> LoopKey {
        self.loops.insert(LoopData {
            coedges: Vec::new(),
        })
    }

    pub(crate) fn push_coedge(&mut self, lp: LoopKey, coedge: CoEdgeKey) -> Result<()> {
        if !self.coedges.contains_key(coedge) {
            return Err(Error::NotFound(coedge.into()));
        }
        if self.coedge_to_loop.contains_key(&coedge) {
            return Err(Error::CoEdgeInUse(coedge));
        }
        let data = self.loops.get_mut(lp).ok_or(Error::NotFound(lp.into()))?;
        data.coedges.push(coedge);
        self.coedge_to_loop.insert(coedge, lp);
        Ok(())
    }

    pub(crate) fn new_face(&mut self, sense: Sense, shell_sense: Sense) -> FaceKey {
        self.faces.insert(FaceData {
            loops: Vec::new(),
            sense,
            shell_sense,
        })
    }

    pub(crate) fn push_loop(&mut self, face: FaceKey, lp: LoopKey) -> Result<()> {
        if !self.loops.contains_key(lp) {
            return Err(Error::NotFound(lp.into()));
        }
        let data = self.faces.get_mut(face).ok_or(Error::NotFound(face.into()))?;
        data.loops.push(lp);
        self.link_loop_face(lp, face);
        Ok(())
    }

    pub(crate) fn new_shell(&mut self, sense: Sense) -> ShellKey {
        self.shells.insert(ShellData {
            faces: Vec::new(),
            sense,
        })
    }

    pub(crate) fn push_face(&mut self, shell: ShellKey, face: FaceKey) -> Result<()> {
        if !self.faces.contains_key(face) {
            return Err(Error::NotFound(face.into()));
        }
        let data = self
            .shells
            .get_mut(shell)
            .ok_or(Error::NotFound(shell.into()))?;
        data.faces.push(face);
        self.link_face_shell(face, shell);
        Ok(())
    }

    pub(crate) fn new_lump(&mut self) -> LumpKey {
        self.lumps.insert(LumpData {
            shells: Vec::new(),
            body: None,
        })
    }

    pub(crate) fn push_shell(&mut self, lump: LumpKey, shell: ShellKey) -> Result<()> {
        if !self.shells.contains_key(shell) {
            return Err(Error::NotFound(shell.into()));
        }
        let data = self.lumps.get_mut(lump).ok_or(Error::NotFound(lump.into()))?;
        if data.shells.contains(&shell) {
            return Ok(());
        }
        data.shells.push(shell);
        self.link_shell_lump(shell, lump);
        Ok(())
    }

    pub(crate) fn new_body(&mut self) -> BodyKey {
        self.bodies.insert(BodyData {
            lumps: Vec::new(),
            transform: Matrix4::identity(),
            bounding_box: None,
        })
    }
}

/// Helper to build a planar polygon face from its corner points.
///
/// Creates one curve, one forward co-edge per side, one loop and one face.
/// Curves are not shared with anything else. Returns `(face, loop, curves)`.
pub fn make_polygon_face(
    arena: &mut TopologyArena,
    corners: &[PointKey],
) -> Result<(FaceKey, LoopKey, Vec<CurveKey>)> {
    if corners.is_empty() {
        return Err(Error::EmptyLoop);
    }

    let mut curves = Vec::with_capacity(corners.len());
    let mut coedges = Vec::with_capacity(corners.len());
    for i in 0..corners.len() {
        let curve = arena.add_curve(corners[i], corners[(i + 1) % corners.len()])?;
        coedges.push(arena.add_coedge(curve, Sense::Forward)?);
        curves.push(curve);
    }
    let lp = arena.add_loop(&coedges)?;
    let face = arena.add_face(&[lp])?;
    Ok((face, lp, curves))
}
