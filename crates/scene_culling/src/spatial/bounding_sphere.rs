//! Bounding sphere with "infinite" and "nothing" states

use std::fmt;

use crate::foundation::math::{Transform, Vec3};

use super::bounding_volume::{BoundingVolume, TestResult};

/// A bounding sphere.
///
/// A negative radius means the sphere contains everything, a zero radius
/// means it contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::nothing()
    }
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere containing everything
    pub fn infinite() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: -1.0,
        }
    }

    /// Sphere containing nothing
    pub fn nothing() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: 0.0,
        }
    }

    /// Overwrite center and radius
    pub fn set(&mut self, center: Vec3, radius: f32) {
        self.center = center;
        self.radius = radius;
    }

    /// Make this sphere contain everything
    pub fn set_infinite(&mut self) {
        self.radius = -1.0;
    }

    /// Make this sphere contain nothing
    pub fn set_nothing(&mut self) {
        self.radius = 0.0;
    }

    /// True if the sphere contains everything
    pub fn is_infinite(&self) -> bool {
        self.radius < 0.0
    }

    /// True if the sphere contains nothing
    pub fn is_nothing(&self) -> bool {
        self.radius == 0.0
    }

    /// Grow the sphere just enough to include `pos`
    pub fn add(&mut self, pos: Vec3) {
        if self.is_infinite() {
            return;
        }
        let diff = pos - self.center;
        let dst = diff.magnitude();
        if dst <= self.radius {
            return;
        }
        // Far end of the old sphere, seen from the new point
        let end_finder = diff.normalize() * -self.radius;
        self.radius = (self.radius + dst) / 2.0;
        self.center = (pos + self.center + end_finder) / 2.0;
    }

    /// Apply a transform in place. The radius is scaled by the largest axis
    /// scale so the result still encloses the transformed geometry.
    pub fn apply_transform(&mut self, transform: &Transform) {
        self.center = transform.apply(self.center);
        self.radius *= transform.max_scaling_factor();
    }

    /// Transformed copy of this sphere
    pub fn transformed(&self, transform: &Transform) -> Self {
        let mut result = *self;
        result.apply_transform(transform);
        result
    }

    /// Move the sphere
    pub fn translate(&mut self, translation: Vec3) {
        self.center += translation;
    }

    /// Test whether the infinite ray `begin + dir * t, t >= 0` touches the sphere
    pub fn ray_hits(&self, begin: Vec3, dir: Vec3) -> bool {
        if self.is_infinite() {
            return true;
        }
        debug_assert!(dir.magnitude_squared() > 0.0, "Ray direction cannot be zero");
        let dir_len_sq = dir.magnitude_squared();
        let to_begin = begin - self.center;
        if to_begin.dot(&dir) > 0.0 {
            // Ray starts past the center and moves away from it
            to_begin.magnitude() < self.radius
        } else {
            let m = -to_begin.dot(&dir) / dir_len_sq;
            let nearest = begin + dir * m;
            (nearest - self.center).magnitude() < self.radius
        }
    }

    /// Classify another volume against this sphere
    pub fn test_another_bounding_volume<'b>(&self, other: impl Into<BoundingVolume<'b>>) -> TestResult {
        BoundingVolume::from(self).test(other.into())
    }

    /// Classify another sphere against this one
    pub fn test_sphere(&self, other: &BoundingSphere) -> TestResult {
        if self.is_infinite() {
            return TestResult::Inside;
        }
        if other.is_infinite() {
            return TestResult::PartiallyInside;
        }
        let distance = (self.center - other.center).magnitude();
        if distance > self.radius + other.radius {
            return TestResult::Outside;
        }
        if distance < self.radius - other.radius {
            return TestResult::Inside;
        }
        TestResult::PartiallyInside
    }

    /// Exact point containment
    pub fn is_position_inside(&self, pos: Vec3) -> bool {
        if self.is_infinite() {
            return true;
        }
        (pos - self.center).magnitude() < self.radius
    }
}

impl fmt::Display for BoundingSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "INF")
        } else {
            write!(
                f,
                "({}, {}, {}) / {}",
                self.center.x, self.center.y, self.center.z, self.radius
            )
        }
    }
}
