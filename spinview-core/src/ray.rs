//! Ray casting against triangles and bounding boxes
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::{Aabb, Mesh, Triangle};

const PARALLEL_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Not required to be unit length; distances are in multiples of it
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Map the ray through an affine transform
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            origin: matrix.transform_point(&self.origin),
            direction: matrix.transform_vector(&self.direction),
        }
    }

    /// Möller–Trumbore intersection, returning the distance along the ray.
    ///
    /// Both faces count as hits; the model is tested regardless of winding.
    pub fn intersect_triangle(&self, triangle: &Triangle) -> Option<f32> {
        let [v0, v1, v2] = triangle.positions();
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = self.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        (t >= 0.0).then_some(t)
    }

    /// Slab test, returning the entry distance (zero when starting inside)
    pub fn intersect_aabb(&self, bounds: &Aabb) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (lo, hi) = (bounds.min[axis], bounds.max[axis]);

            if direction.abs() < PARALLEL_EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let t1 = (lo - origin) / direction;
            let t2 = (hi - origin) / direction;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        (t_max >= t_min && t_max >= 0.0).then(|| t_min.max(0.0))
    }

    /// Nearest hit against a mesh, with a bounds check first
    pub fn intersect_mesh(&self, mesh: &Mesh) -> Option<f32> {
        self.intersect_aabb(&mesh.bounds()?)?;
        mesh.triangles
            .iter()
            .filter_map(|triangle| self.intersect_triangle(triangle))
            .min_by(f32::total_cmp)
    }
}
