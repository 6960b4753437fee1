//! View and occlusion frustums
//!
//! A frustum is a [`BoundingConvex`] whose side planes all pass through one
//! apex, plus the `All` and `Empty` sentinels that skip plane arithmetic.

use crate::core::CameraConfig;
use crate::error::FrustumError;
use crate::foundation::math::{utils, Plane, Vec2, Vec3};

use super::bounding_convex::BoundingConvex;
use super::bounding_sphere::BoundingSphere;
use super::bounding_volume::{BoundingVolume, TestResult};

/// Tolerance for the camera basis checks
const BASIS_TOLERANCE: f32 = 0.001;

/// Apexes closer than this (squared) count as the same position
const SAME_POSITION_SQ: f32 = 0.000001;

/// Which kind of region a [`ViewFrustum`] covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumKind {
    /// Bounded by the wrapped convex region
    Normal,
    /// Contains everything
    All,
    /// Contains nothing
    Empty,
}

/// Frustum with an apex at `position`
#[derive(Debug, Clone, PartialEq)]
pub struct ViewFrustum {
    kind: FrustumKind,
    position: Vec3,
    region: BoundingConvex,
}

impl Default for ViewFrustum {
    fn default() -> Self {
        Self::empty(Vec3::zeros())
    }
}

impl ViewFrustum {
    /// Build a frustum from a camera basis and the polygon it sees.
    ///
    /// `vertices` are in `(right, up)` units on the plane one unit along
    /// `dir`, in loop order. An empty polygon gives an `Empty` frustum.
    pub fn new(
        position: Vec3,
        dir: Vec3,
        up: Vec3,
        right: Vec3,
        vertices: &[Vec2],
        near: Option<f32>,
        far: Option<f32>,
    ) -> Result<Self, FrustumError> {
        check_basis(dir, up, right)?;

        if vertices.is_empty() {
            return Ok(Self::empty(position));
        }
        if vertices.len() < 3 {
            return Err(FrustumError::TooFewVertices(vertices.len()));
        }
        if let (Some(near), Some(far)) = (near, far) {
            if near >= far {
                return Err(FrustumError::NearNotBeforeFar { near, far });
            }
        }

        let to_world = |v: &Vec2| right * v.x + up * v.y + dir;
        let mut planes = Vec::with_capacity(vertices.len() + 2);
        let mut v0 = to_world(&vertices[0]);
        for i in 0..vertices.len() {
            let v1 = to_world(&vertices[(i + 1) % vertices.len()]);
            let mut side = Plane::from_normal_point(v1.cross(&v0), position);
            if side.normal().dot(&dir) < 0.0 {
                side.swap_normal();
            }
            planes.push(side);
            v0 = v1;
        }
        if let Some(near) = near {
            planes.push(Plane::from_normal_point(dir, position + dir * near));
        }
        if let Some(far) = far {
            let mut far_plane = Plane::from_normal_point(dir, position + dir * far);
            far_plane.swap_normal();
            planes.push(far_plane);
        }

        log::trace!("Building view frustum at {:?} from {} planes", position, planes.len());
        Ok(Self::from_convex(position, BoundingConvex::from_planes(&planes)))
    }

    /// Rectangular frustum from field of view angles in radians
    pub fn from_camera(
        position: Vec3,
        dir: Vec3,
        up: Vec3,
        right: Vec3,
        fov_y: f32,
        fov_x: f32,
        near: Option<f32>,
        far: Option<f32>,
    ) -> Result<Self, FrustumError> {
        let fov_y_tan = (fov_y / 2.0).tan();
        let fov_x_tan = (fov_x / 2.0).tan();
        let vertices = [
            Vec2::new(fov_x_tan, fov_y_tan),
            Vec2::new(-fov_x_tan, fov_y_tan),
            Vec2::new(-fov_x_tan, -fov_y_tan),
            Vec2::new(fov_x_tan, -fov_y_tan),
        ];
        Self::new(position, dir, up, right, &vertices, near, far)
    }

    /// Rectangular frustum for a camera given by yaw, pitch and roll (radians)
    pub fn from_camera_angles(
        position: Vec3,
        yaw: f32,
        pitch: f32,
        roll: f32,
        fov_y: f32,
        fov_x: f32,
        near: Option<f32>,
        far: Option<f32>,
    ) -> Result<Self, FrustumError> {
        let (dir, up, right) = utils::camera_directions(yaw, pitch, roll);
        Self::from_camera(position, dir, up, right, fov_y, fov_x, near, far)
    }

    /// Rectangular frustum using the field of view and clip distances of `config`
    pub fn from_config(
        position: Vec3,
        dir: Vec3,
        up: Vec3,
        right: Vec3,
        config: &CameraConfig,
    ) -> Result<Self, FrustumError> {
        Self::from_camera(
            position,
            dir,
            up,
            right,
            utils::deg_to_rad(config.fov_y_degrees),
            utils::deg_to_rad(config.fov_x_degrees),
            config.near,
            config.far,
        )
    }

    /// Wrap an existing convex region with its apex at `position`
    pub fn from_convex(position: Vec3, region: BoundingConvex) -> Self {
        let kind = if region.is_nothing() {
            FrustumKind::Empty
        } else {
            FrustumKind::Normal
        };
        Self { kind, position, region }
    }

    /// Frustum containing everything
    pub fn all(position: Vec3) -> Self {
        Self {
            kind: FrustumKind::All,
            position,
            region: BoundingConvex::new(),
        }
    }

    /// Frustum containing nothing
    pub fn empty(position: Vec3) -> Self {
        Self {
            kind: FrustumKind::Empty,
            position,
            region: BoundingConvex::new(),
        }
    }

    /// Apex position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sentinel or normal
    pub fn kind(&self) -> FrustumKind {
        self.kind
    }

    /// True for the `Empty` sentinel
    pub fn is_empty(&self) -> bool {
        self.kind == FrustumKind::Empty
    }

    /// True for the `All` sentinel
    pub fn is_all(&self) -> bool {
        self.kind == FrustumKind::All
    }

    /// Convex region of a normal frustum
    pub fn region(&self) -> &BoundingConvex {
        &self.region
    }

    /// Classify a volume against the frustum
    pub fn test_bounding_volume<'b>(&self, bv: impl Into<BoundingVolume<'b>>) -> TestResult {
        match self.kind {
            FrustumKind::Empty => TestResult::Outside,
            FrustumKind::All => TestResult::Inside,
            FrustumKind::Normal => self.region.test_another_bounding_volume(bv),
        }
    }

    /// Classify a sphere against the frustum
    pub fn test_bounding_sphere(&self, sphere: &BoundingSphere) -> TestResult {
        match self.kind {
            FrustumKind::Empty => TestResult::Outside,
            FrustumKind::All => TestResult::Inside,
            FrustumKind::Normal => self.region.test_sphere(sphere),
        }
    }

    /// Point containment
    pub fn test_point(&self, point: Vec3) -> bool {
        match self.kind {
            FrustumKind::Empty => false,
            FrustumKind::All => true,
            FrustumKind::Normal => self.region.is_position_inside(point),
        }
    }

    /// Region seen by both frustums. Both must share the same apex.
    pub fn do_intersection(&self, other: &ViewFrustum) -> Result<ViewFrustum, FrustumError> {
        if (self.position - other.position).magnitude_squared() >= SAME_POSITION_SQ {
            return Err(FrustumError::PositionMismatch);
        }
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty(self.position));
        }
        if self.is_all() {
            return Ok(other.clone());
        }
        if other.is_all() {
            return Ok(self.clone());
        }
        Ok(Self::from_convex(self.position, self.region.intersection(&other.region)))
    }
}

fn check_basis(dir: Vec3, up: Vec3, right: Vec3) -> Result<(), FrustumError> {
    for (name, a, b) in [("dir/up", dir, up), ("up/right", up, right), ("right/dir", right, dir)] {
        if a.dot(&b).abs() >= BASIS_TOLERANCE {
            return Err(FrustumError::NonOrthonormalBasis(format!("{name} are not perpendicular")));
        }
    }
    for (name, v) in [("dir", dir), ("up", up), ("right", right)] {
        if (v.magnitude_squared() - 1.0).abs() >= BASIS_TOLERANCE {
            return Err(FrustumError::NonOrthonormalBasis(format!("{name} is not normalized")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::BoundingBox;
    use std::f32::consts::FRAC_PI_2;

    // Z up, looking along +Y
    fn forward_camera(near: Option<f32>, far: Option<f32>) -> ViewFrustum {
        ViewFrustum::from_camera(
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            FRAC_PI_2,
            FRAC_PI_2,
            near,
            far,
        )
        .unwrap()
    }

    #[test]
    fn test_points_against_camera_frustum() {
        let frustum = forward_camera(Some(1.0), Some(10.0));
        assert_eq!(frustum.kind(), FrustumKind::Normal);
        assert_eq!(frustum.region().cutplanes().len(), 6);
        assert!(frustum.test_point(Vec3::new(0.0, 5.0, 0.0)));
        assert!(frustum.test_point(Vec3::new(4.0, 5.0, -4.0)));
        assert!(!frustum.test_point(Vec3::new(6.0, 5.0, 0.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, 0.5, 0.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, 11.0, 0.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, -5.0, 0.0)));
    }

    #[test]
    fn test_open_frustum_keeps_side_planes() {
        let frustum = forward_camera(None, None);
        assert_eq!(frustum.region().cutplanes().len(), 4);
        assert!(frustum.test_point(Vec3::new(0.0, 1000.0, 0.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_sphere_and_box_classification() {
        let frustum = forward_camera(Some(1.0), Some(10.0));
        let inside = BoundingSphere::new(Vec3::new(0.0, 5.0, 0.0), 1.0);
        let crossing_far = BoundingSphere::new(Vec3::new(0.0, 10.0, 0.0), 1.0);
        let behind = BoundingSphere::new(Vec3::new(0.0, -5.0, 0.0), 1.0);
        assert_eq!(frustum.test_bounding_sphere(&inside), TestResult::Inside);
        assert_eq!(frustum.test_bounding_sphere(&crossing_far), TestResult::PartiallyInside);
        assert_eq!(frustum.test_bounding_volume(&behind), TestResult::Outside);

        let aabb = BoundingBox::new(Vec3::new(-0.5, 4.5, -0.5), Vec3::new(0.5, 5.5, 0.5));
        assert_eq!(frustum.test_bounding_volume(&aabb), TestResult::Inside);
    }

    #[test]
    fn test_sentinels() {
        let sphere = BoundingSphere::new(Vec3::new(3.0, -2.0, 1.0), 1.0);
        let all = ViewFrustum::all(Vec3::zeros());
        let empty = ViewFrustum::empty(Vec3::zeros());
        assert_eq!(all.test_bounding_sphere(&sphere), TestResult::Inside);
        assert_eq!(empty.test_bounding_sphere(&sphere), TestResult::Outside);
        assert_eq!(all.test_bounding_volume(&BoundingSphere::infinite()), TestResult::Inside);
        assert!(all.test_point(Vec3::new(1e6, 0.0, 0.0)));
        assert!(!empty.test_point(Vec3::zeros()));
        assert!(ViewFrustum::default().is_empty());
    }

    #[test]
    fn test_construction_errors() {
        let dir = Vec3::new(0.0, 1.0, 0.0);
        let up = Vec3::new(0.0, 0.0, 1.0);
        let right = Vec3::new(1.0, 0.0, 0.0);
        let square = [
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
        ];

        assert!(matches!(
            ViewFrustum::new(Vec3::zeros(), dir, dir, right, &square, None, None),
            Err(FrustumError::NonOrthonormalBasis(_))
        ));
        assert!(matches!(
            ViewFrustum::new(Vec3::zeros(), dir * 2.0, up, right, &square, None, None),
            Err(FrustumError::NonOrthonormalBasis(_))
        ));
        assert_eq!(
            ViewFrustum::new(Vec3::zeros(), dir, up, right, &square[..2], None, None),
            Err(FrustumError::TooFewVertices(2))
        );
        assert_eq!(
            ViewFrustum::new(Vec3::zeros(), dir, up, right, &square, Some(5.0), Some(5.0)),
            Err(FrustumError::NearNotBeforeFar { near: 5.0, far: 5.0 })
        );
        let no_polygon = ViewFrustum::new(Vec3::zeros(), dir, up, right, &[], None, None).unwrap();
        assert!(no_polygon.is_empty());
    }

    #[test]
    fn test_triangle_polygon() {
        let triangle = [Vec2::new(0.0, 1.0), Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0)];
        let frustum = ViewFrustum::new(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            &triangle,
            Some(0.5),
            None,
        )
        .unwrap();
        assert!(frustum.test_point(Vec3::new(0.0, 4.0, 2.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, 4.0, 6.5)));
    }

    #[test]
    fn test_from_camera_angles_matches_basis() {
        let by_angles = ViewFrustum::from_camera_angles(Vec3::zeros(), 0.0, 0.0, 0.0, FRAC_PI_2, FRAC_PI_2, Some(1.0), None).unwrap();
        assert!(by_angles.test_point(Vec3::new(0.0, 5.0, 0.0)));
        assert!(!by_angles.test_point(Vec3::new(0.0, -5.0, 0.0)));
    }

    #[test]
    fn test_from_config_uses_degrees() {
        let config = CameraConfig {
            fov_x_degrees: 90.0,
            fov_y_degrees: 90.0,
            near: Some(1.0),
            far: Some(10.0),
        };
        let frustum = ViewFrustum::from_config(
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            &config,
        )
        .unwrap();
        assert!(frustum.test_point(Vec3::new(4.0, 5.0, 0.0)));
        assert!(!frustum.test_point(Vec3::new(0.0, 12.0, 0.0)));
    }

    #[test]
    fn test_intersection() {
        let forward = forward_camera(None, None);
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let diagonal = ViewFrustum::from_camera(
            Vec3::zeros(),
            Vec3::new(s, s, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(s, -s, 0.0),
            FRAC_PI_2,
            FRAC_PI_2,
            None,
            None,
        )
        .unwrap();

        let both = forward.do_intersection(&diagonal).unwrap();
        assert_eq!(both.kind(), FrustumKind::Normal);
        assert!(both.test_point(Vec3::new(1.0, 5.0, 0.0)));
        assert!(!both.test_point(Vec3::new(-1.0, 5.0, 0.0)));
        assert!(!both.test_point(Vec3::new(5.0, 1.0, 0.0)));

        let all = ViewFrustum::all(Vec3::zeros());
        assert_eq!(all.do_intersection(&forward).unwrap(), forward);
        assert!(forward.do_intersection(&ViewFrustum::empty(Vec3::zeros())).unwrap().is_empty());
    }

    #[test]
    fn test_intersection_requires_same_apex() {
        let a = ViewFrustum::all(Vec3::zeros());
        let b = ViewFrustum::all(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(a.do_intersection(&b), Err(FrustumError::PositionMismatch));
    }
}
