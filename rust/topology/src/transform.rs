// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Body transforms and bounding boxes.
//!
//! A body carries one accumulated matrix. Every operation composes its own
//! matrix in front of the stored one (`new * old`); point coordinates are
//! never rewritten, since points may be shared with other bodies through
//! the same import session. The world-space bounding box is cached on the
//! body and dropped whenever the matrix or the lump set changes.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;

const DEGENERATE_EPS: f64 = 1e-15;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Smallest box containing all points, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bbox.min = bbox.min.inf(&p);
            bbox.max = bbox.max.sup(&p);
        }
        Some(bbox)
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Returns `true` if `p` lies inside or on the box.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

impl TopologyArena {
    /// Returns the stored transform of a body.
    pub fn body_transform(&self, body: BodyKey) -> Option<&Matrix4<f64>> {
        self.bodies.get(body).map(|b| &b.transform)
    }

    /// Replaces the stored transform of a body.
    pub fn set_transform(&mut self, body: BodyKey, matrix: Matrix4<f64>) -> Result<()> {
        let data = self
            .bodies
            .get_mut(body)
            .ok_or(Error::NotFound(body.into()))?;
        data.transform = matrix;
        data.bounding_box = None;
        Ok(())
    }

    /// Moves a body by `(dx, dy, dz)`.
    pub fn translate(&mut self, body: BodyKey, dx: f64, dy: f64, dz: f64) -> Result<()> {
        self.compose(body, Matrix4::new_translation(&Vector3::new(dx, dy, dz)))
    }

    /// Rotates a body about an axis through the origin. `angle` is in
    /// radians.
    pub fn rotate(&mut self, body: BodyKey, axis: &Vector3<f64>, angle: f64) -> Result<()> {
        let unit_axis = Unit::try_new(*axis, DEGENERATE_EPS)
            .ok_or(Error::DegenerateTransform("rotation axis has zero length"))?;
        let rotation = Rotation3::from_axis_angle(&unit_axis, angle);
        self.compose(body, rotation.to_homogeneous())
    }

    /// Scales a body uniformly about the origin.
    pub fn scale(&mut self, body: BodyKey, factor: f64) -> Result<()> {
        if factor.abs() < DEGENERATE_EPS {
            return Err(Error::DegenerateTransform("scale factor is zero"));
        }
        self.compose(body, Matrix4::new_scaling(factor))
    }

    /// Scales a body per axis. Only equal factors are accepted.
    pub fn scale_xyz(&mut self, body: BodyKey, sx: f64, sy: f64, sz: f64) -> Result<()> {
        if sx != sy || sy != sz {
            return Err(Error::NonUniformScale);
        }
        self.scale(body, sx)
    }

    /// Mirrors a body through the plane through the origin with the given
    /// normal.
    pub fn reflect(&mut self, body: BodyKey, normal: &Vector3<f64>) -> Result<()> {
        let n = Unit::try_new(*normal, DEGENERATE_EPS)
            .ok_or(Error::DegenerateTransform("reflection normal has zero length"))?;
        let n = n.into_inner();
        let householder = Matrix3::identity() - (n * n.transpose()) * 2.0;
        self.compose(body, householder.to_homogeneous())
    }

    /// Undoes every transform applied so far and returns the matrix that
    /// was removed.
    pub fn restore(&mut self, body: BodyKey) -> Result<Matrix4<f64>> {
        let data = self
            .bodies
            .get_mut(body)
            .ok_or(Error::NotFound(body.into()))?;
        let previous = std::mem::replace(&mut data.transform, Matrix4::identity());
        data.bounding_box = None;
        Ok(previous)
    }

    fn compose(&mut self, body: BodyKey, matrix: Matrix4<f64>) -> Result<()> {
        let data = self
            .bodies
            .get_mut(body)
            .ok_or(Error::NotFound(body.into()))?;
        data.transform = matrix * data.transform;
        data.bounding_box = None;
        Ok(())
    }

    /// Returns the points of a body mapped through its transform.
    pub fn body_world_points(&self, body: BodyKey) -> Option<Vec<Point3<f64>>> {
        let matrix = self.bodies.get(body)?.transform;
        let keys = self.body_points(body)?;
        Some(
            keys.into_iter()
                .filter_map(|k| self.points.get(k))
                .map(|p| matrix.transform_point(&Point3::new(p.x, p.y, p.z)))
                .collect(),
        )
    }

    /// Returns the world-space bounding box of a body, computing and caching
    /// it if needed. `None` for an unknown body or a body without points.
    pub fn bounding_box(&mut self, body: BodyKey) -> Option<BoundingBox> {
        if let Some(cached) = self.bodies.get(body)?.bounding_box {
            return Some(cached);
        }
        let bbox = BoundingBox::from_points(self.body_world_points(body)?)?;
        if let Some(data) = self.bodies.get_mut(body) {
            data.bounding_box = Some(bbox);
        }
        Some(bbox)
    }

    /// Returns the cached bounding box without recomputing it.
    pub fn cached_bounding_box(&self, body: BodyKey) -> Option<BoundingBox> {
        self.bodies.get(body)?.bounding_box
    }

    pub(crate) fn invalidate_bounding_box(&mut self, body: BodyKey) {
        if let Some(data) = self.bodies.get_mut(body) {
            data.bounding_box = None;
        }
    }
}
