//! Axis-aligned bounding box

use crate::foundation::math::Vec3;

use super::bounding_sphere::BoundingSphere;
use super::bounding_volume::{BoundingVolume, TestResult};

/// Axis-aligned bounding box, `min <= max` on every axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }
}

impl BoundingBox {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.x <= max.x, "Minimum X component is bigger than maximum");
        debug_assert!(min.y <= max.y, "Minimum Y component is bigger than maximum");
        debug_assert!(min.z <= max.z, "Minimum Z component is bigger than maximum");
        Self { min, max }
    }

    /// Smallest box containing a triangle
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self::new(v0.inf(&v1).inf(&v2), v0.sup(&v1).sup(&v2))
    }

    /// Box around a capsule. Not tight; the endpoints' box grown by `radius`.
    pub fn from_capsule(pos0: Vec3, pos1: Vec3, radius: f32) -> Self {
        let grow = Vec3::repeat(radius);
        Self::new(pos0.inf(&pos1) - grow, pos0.sup(&pos1) + grow)
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Get the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along X
    pub fn width_x(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Size along Y
    pub fn depth_y(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Size along Z
    pub fn height_z(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Length of the diagonal from min to max
    pub fn space_diagonal_length(&self) -> f32 {
        (self.max - self.min).magnitude()
    }

    /// Check if this box overlaps another box on all three axes
    pub fn hits_bounding_box(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Test ray intersection with this box using slab method
    /// Returns the distance to the entry point if the ray intersects, None otherwise
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray_dir.x != 0.0 { 1.0 / ray_dir.x } else { f32::INFINITY },
            if ray_dir.y != 0.0 { 1.0 / ray_dir.y } else { f32::INFINITY },
            if ray_dir.z != 0.0 { 1.0 / ray_dir.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        // Ray intersects if tmax >= tmin and tmax >= 0
        if tmax >= tmin && tmax >= 0.0 {
            // Entry point distance, or 0 if we're inside the box
            Some(tmin.max(0.0))
        } else {
            None
        }
    }

    /// Classify another volume against this box
    pub fn test_another_bounding_volume<'b>(&self, other: impl Into<BoundingVolume<'b>>) -> TestResult {
        BoundingVolume::from(self).test(other.into())
    }

    /// Classify a sphere against this box, one face at a time
    pub fn test_sphere(&self, sphere: &BoundingSphere) -> TestResult {
        if sphere.is_infinite() {
            return TestResult::PartiallyInside;
        }
        let c = sphere.center;
        let r = sphere.radius;
        let distances_to_sides = [
            self.max.x - c.x,
            c.x - self.min.x,
            self.max.y - c.y,
            c.y - self.min.y,
            self.max.z - c.z,
            c.z - self.min.z,
        ];
        let mut fully_inside = true;
        for distance in distances_to_sides {
            if distance < -r {
                return TestResult::Outside;
            }
            if distance < r {
                fully_inside = false;
            }
        }
        if fully_inside {
            TestResult::Inside
        } else {
            TestResult::PartiallyInside
        }
    }

    /// Classify another box against this one
    pub fn test_box(&self, other: &BoundingBox) -> TestResult {
        if self.max.x > other.max.x && self.max.y > other.max.y && self.max.z > other.max.z &&
           self.min.x < other.min.x && self.min.y < other.min.y && self.min.z < other.min.z {
            return TestResult::Inside;
        }
        if !self.hits_bounding_box(other) {
            return TestResult::Outside;
        }
        TestResult::PartiallyInside
    }

    /// Point containment, boundary included
    pub fn is_position_inside(&self, pos: Vec3) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x &&
        pos.y >= self.min.y && pos.y <= self.max.y &&
        pos.z >= self.min.z && pos.z <= self.max.z
    }
}
