//! Math utilities and types
//!
//! Provides the vector, transform and plane primitives the culling core is
//! written against.

use std::fmt;

pub use nalgebra::{
    Vector2, Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Affine transform backed by a 4x4 matrix.
///
/// Points are column vectors, so `apply` computes `matrix * p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            matrix: Mat4::new_translation(&position),
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self::from_trs(position, rotation, Vec3::new(1.0, 1.0, 1.0))
    }

    /// Create a transform from translation, rotation and scale (TRS order)
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            matrix: Mat4::new_translation(&position)
                * rotation.to_homogeneous()
                * Mat4::new_nonuniform_scaling(&scale),
        }
    }

    /// Wrap an existing affine matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Apply this transform to a point
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point(&Point3::from(point)).coords
    }

    /// Apply this transform to a direction (translation ignored)
    pub fn apply_vector(&self, vector: Vec3) -> Vec3 {
        self.matrix.transform_vector(&vector)
    }

    /// Compose two transforms: the result applies `self` first, then `other`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Get the inverse transform, if the matrix is invertible
    pub fn inverse(&self) -> Option<Transform> {
        self.matrix.try_inverse().map(|matrix| Transform { matrix })
    }

    /// Length of the longest basis vector.
    ///
    /// Scaling a radius by this keeps a transformed sphere a safe
    /// over-approximation under non-uniform scale.
    pub fn max_scaling_factor(&self) -> f32 {
        let m = &self.matrix;
        let x = Vec3::new(m.m11, m.m21, m.m31).magnitude_squared();
        let y = Vec3::new(m.m12, m.m22, m.m32).magnitude_squared();
        let z = Vec3::new(m.m13, m.m23, m.m33).magnitude_squared();
        x.max(y).max(z).sqrt()
    }

    /// Translation part of the transform
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.matrix.m14, self.matrix.m24, self.matrix.m34)
    }

    /// Reset to identity
    pub fn reset(&mut self) {
        self.matrix = Mat4::identity();
    }

    /// Overwrite the translation part
    pub fn set_position(&mut self, position: Vec3) {
        self.matrix.m14 = position.x;
        self.matrix.m24 = position.y;
        self.matrix.m34 = position.z;
    }

    /// Translate in parent space
    pub fn translate(&mut self, v: Vec3) {
        self.matrix = Mat4::new_translation(&v) * self.matrix;
    }

    /// Rotate around the parent X axis
    pub fn rotate_x(&mut self, angle: f32) {
        self.matrix = Mat4::rotation_x(angle) * self.matrix;
    }

    /// Rotate around the parent Y axis
    pub fn rotate_y(&mut self, angle: f32) {
        self.matrix = Mat4::rotation_y(angle) * self.matrix;
    }

    /// Rotate around the parent Z axis
    pub fn rotate_z(&mut self, angle: f32) {
        self.matrix = Mat4::rotation_z(angle) * self.matrix;
    }

    /// Scale per axis in parent space
    pub fn scale(&mut self, v: Vec3) {
        self.matrix = Mat4::new_nonuniform_scaling(&v) * self.matrix;
    }
}

/// Plane with a unit normal, stored as `dot(normal, p) == distance_from_origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vec3,
    distance_from_origin: f32,
}

impl Plane {
    /// Create a plane from a normal and a signed distance from the origin
    pub fn from_normal_distance(normal: Vec3, distance_from_origin: f32) -> Self {
        debug_assert!(normal.magnitude() > 0.0, "Unable to form plane from zero normal");
        Self {
            normal: normal.normalize(),
            distance_from_origin,
        }
    }

    /// Create a plane from a normal and any position on it
    pub fn from_normal_point(normal: Vec3, pos_at_plane: Vec3) -> Self {
        debug_assert!(normal.magnitude() > 0.0, "Unable to form plane from zero normal");
        let normal = normal.normalize();
        Self {
            normal,
            distance_from_origin: normal.dot(&pos_at_plane),
        }
    }

    /// Create a plane through a triangle, normal by the right-hand rule
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let normal = (v1 - v0).cross(&(v2 - v0));
        Self::from_normal_point(normal, v0)
    }

    /// Unit normal
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed distance of the plane from the origin
    pub fn distance_from_origin(&self) -> f32 {
        self.distance_from_origin
    }

    /// Point of the plane closest to the origin
    pub fn position(&self) -> Vec3 {
        self.normal * self.distance_from_origin
    }

    /// Flip the plane so it faces the other way
    pub fn swap_normal(&mut self) {
        self.normal = -self.normal;
        self.distance_from_origin = -self.distance_from_origin;
    }

    /// Intersect the infinite line `begin + dir * m` with this plane.
    ///
    /// Returns the hit position and the multiplier `m`. Lines that are too
    /// short or nearly parallel to the plane do not hit.
    pub fn hits_line(&self, begin: Vec3, dir: Vec3) -> Option<(Vec3, f32)> {
        let dir_len = dir.magnitude();
        if dir_len < 0.00001 {
            return None;
        }
        let dp_n_d = self.normal.dot(&dir);
        let radians = (dp_n_d / dir_len).clamp(-1.0, 1.0).asin();
        if radians.abs() < 0.0002 {
            return None;
        }
        let dir_m = (self.distance_from_origin - self.normal.dot(&begin)) / dp_n_d;
        Some((begin + dir * dir_m, dir_m))
    }

    /// Like `hits_line`, but only forward along `dir`.
    pub fn hits_ray(&self, begin: Vec3, dir: Vec3) -> Option<(Vec3, f32)> {
        self.hits_line(begin, dir).filter(|(_, m)| *m >= 0.0)
    }

    /// Intersection line of two planes as `(position, unit direction)`.
    pub fn hits_plane(&self, other: &Plane) -> Option<(Vec3, Vec3)> {
        let dir = self.normal.cross(&other.normal);
        let dir_len = dir.magnitude();
        // Planes that would only meet far away count as parallel
        if dir_len < 0.00001 {
            return None;
        }
        let dir = dir / dir_len;
        let finder = other.normal.cross(&dir);
        let (line_pos, _) = self.hits_line(other.position(), finder)?;
        Some((line_pos, dir))
    }

    /// True if `pos` is strictly on the side the normal points to
    pub fn is_position_at_front(&self, pos: Vec3) -> bool {
        (pos - self.position()).dot(&self.normal) > 0.0
    }

    /// Signed distance, negative behind the plane
    pub fn distance_to_position(&self, pos: Vec3) -> f32 {
        self.normal.dot(&pos) - self.distance_from_origin
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}):{}",
            self.normal.x, self.normal.y, self.normal.z, self.distance_from_origin
        )
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Some vector perpendicular to `v`, no longer than `v`
    pub fn perp(v: Vec3) -> Vec3 {
        if v.x.abs() < v.y.abs() {
            Vec3::new(0.0, v.z, -v.y)
        } else {
            Vec3::new(-v.z, 0.0, v.x)
        }
    }

    /// Camera basis `(dir, up, right)` from yaw, pitch and roll in radians.
    ///
    /// Z is up; yaw 0 looks along +Y, positive pitch looks up.
    pub fn camera_directions(yaw: f32, pitch: f32, roll: f32) -> (Vec3, Vec3, Vec3) {
        let (yaw_s, yaw_c) = yaw.sin_cos();
        let (pitch_s, pitch_c) = pitch.sin_cos();
        let (roll_s, roll_c) = roll.sin_cos();

        let dir = Vec3::new(pitch_c * -yaw_s, pitch_c * yaw_c, pitch_s);
        let right = Vec3::new(
            yaw_c * roll_c - yaw_s * roll_s * pitch_s,
            yaw_s * roll_c + yaw_c * roll_s * pitch_s,
            -roll_s * pitch_c,
        );
        let up = Vec3::new(
            yaw_c * roll_s + yaw_s * -pitch_s * -roll_c,
            yaw_s * roll_s + yaw_c * pitch_s * -roll_c,
            pitch_c * roll_c,
        );
        (dir, up, right)
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_compose_applies_self_first() {
        let mut scale = Transform::identity();
        scale.scale(Vec3::new(2.0, 2.0, 2.0));
        let shift = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let composed = scale.compose(&shift);
        assert_relative_eq!(composed.apply(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);

        let composed = shift.compose(&scale);
        assert_relative_eq!(composed.apply(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(4.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_max_scaling_factor_picks_longest_axis() {
        let mut transform = Transform::identity();
        transform.scale(Vec3::new(1.0, 3.0, 2.0));
        transform.rotate_z(0.7);
        assert_relative_eq!(transform.max_scaling_factor(), 3.0, epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_round_trip() {
        let transform = Transform::from_trs(
            Vec3::new(1.0, -2.0, 3.0),
            Quat::from_axis_angle(&Vec3::y_axis(), 0.4),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let inverse = transform.inverse().expect("invertible");
        let p = Vec3::new(0.5, 0.25, -4.0);
        assert_relative_eq!(inverse.apply(transform.apply(p)), p, epsilon = 1e-4);
    }

    #[test]
    fn test_plane_distance_and_front() {
        let plane = Plane::from_normal_point(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(plane.distance_to_position(Vec3::new(5.0, 5.0, 3.0)), 2.0, epsilon = EPSILON);
        assert!(plane.is_position_at_front(Vec3::new(0.0, 0.0, 1.5)));
        assert!(!plane.is_position_at_front(Vec3::new(0.0, 0.0, 1.0)));
        assert!(!plane.is_position_at_front(Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_swap_normal_flips_sides() {
        let mut plane = Plane::from_normal_point(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        plane.swap_normal();
        assert_relative_eq!(plane.normal(), Vec3::new(0.0, -1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(plane.position(), Vec3::new(0.0, 3.0, 0.0), epsilon = EPSILON);
        assert!(plane.is_position_at_front(Vec3::new(0.0, 2.0, 0.0)));
        assert!(!plane.is_position_at_front(Vec3::new(0.0, 4.0, 0.0)));
    }

    #[test]
    fn test_plane_hits_line() {
        let plane = Plane::from_normal_distance(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let (hit, m) = plane
            .hits_line(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0))
            .expect("line crosses plane");
        assert_relative_eq!(hit, Vec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(m, 0.5, epsilon = EPSILON);

        assert!(plane.hits_line(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0)).is_none());
        assert!(plane.hits_ray(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_plane_hits_plane() {
        let floor = Plane::from_normal_distance(Vec3::new(0.0, 0.0, 1.0), 1.0);
        let wall = Plane::from_normal_distance(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let (pos, dir) = floor.hits_plane(&wall).expect("planes cross");
        assert_relative_eq!(floor.distance_to_position(pos), 0.0, epsilon = EPSILON);
        assert_relative_eq!(wall.distance_to_position(pos), 0.0, epsilon = EPSILON);
        assert_relative_eq!(dir.magnitude(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(dir.dot(&Vec3::new(0.0, 1.0, 0.0)).abs(), 1.0, epsilon = EPSILON);

        let ceiling = Plane::from_normal_distance(Vec3::new(0.0, 0.0, -1.0), -3.0);
        assert!(floor.hits_plane(&ceiling).is_none());
    }

    #[test]
    fn test_camera_directions_are_orthonormal() {
        let (dir, up, right) = utils::camera_directions(0.3, -0.2, 0.1);
        assert_relative_eq!(dir.magnitude(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(up.magnitude(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(right.magnitude(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(dir.dot(&up), 0.0, epsilon = EPSILON);
        assert_relative_eq!(up.dot(&right), 0.0, epsilon = EPSILON);
        assert_relative_eq!(right.dot(&dir), 0.0, epsilon = EPSILON);

        let (dir, up, right) = utils::camera_directions(0.0, 0.0, 0.0);
        assert_relative_eq!(dir, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(up, Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
        assert_relative_eq!(right, Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_perp_is_perpendicular_and_not_longer() {
        for v in [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 0.0), Vec3::new(0.0, 0.0, 2.0)] {
            let p = utils::perp(v);
            assert_relative_eq!(p.dot(&v), 0.0, epsilon = EPSILON);
            assert!(p.magnitude() <= v.magnitude() + EPSILON);
            assert!(p.magnitude() > 0.0);
        }
    }
}
