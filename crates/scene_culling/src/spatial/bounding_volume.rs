//! Bounding volume capability and pairwise classification dispatch
//!
//! Every volume kind answers two questions: where another volume lies
//! relative to it ([`TestResult`]) and whether a point is inside. The
//! classification may report overlap that does not exist, but never misses
//! overlap that does.

use crate::foundation::math::Vec3;

use super::bounding_box::BoundingBox;
use super::bounding_convex::BoundingConvex;
use super::bounding_sphere::BoundingSphere;

/// How a tested volume relates to the testing volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestResult {
    /// No overlap at all
    Outside = 0,
    /// Overlapping, or possibly overlapping
    PartiallyInside = 1,
    /// Completely contained
    Inside = 2,
}

/// Discriminant of a [`BoundingVolume`], used to index the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKind {
    /// [`BoundingSphere`]
    Sphere = 0,
    /// [`BoundingBox`]
    Box = 1,
    /// [`BoundingConvex`]
    Convex = 2,
}

/// Borrowed view of any concrete bounding volume
#[derive(Debug, Clone, Copy)]
pub enum BoundingVolume<'a> {
    /// Sphere volume
    Sphere(&'a BoundingSphere),
    /// Axis-aligned box volume
    Box(&'a BoundingBox),
    /// Half-space intersection volume
    Convex(&'a BoundingConvex),
}

type DirectTest = for<'a, 'b> fn(BoundingVolume<'a>, BoundingVolume<'b>) -> TestResult;

/// `DISPATCH[testing][tested]`. Empty entries are answered by the mirrored
/// entry, so every pair must be filled in at least one direction.
const DISPATCH: [[Option<DirectTest>; 3]; 3] = [
    [Some(sphere_vs_sphere as DirectTest), None, None],
    [Some(box_vs_sphere as DirectTest), Some(box_vs_box as DirectTest), None],
    [
        Some(convex_vs_sphere as DirectTest),
        Some(convex_vs_box as DirectTest),
        Some(convex_vs_convex as DirectTest),
    ],
];

impl<'a> BoundingVolume<'a> {
    /// Kind of the wrapped volume
    pub fn kind(&self) -> VolumeKind {
        match self {
            Self::Sphere(_) => VolumeKind::Sphere,
            Self::Box(_) => VolumeKind::Box,
            Self::Convex(_) => VolumeKind::Convex,
        }
    }

    /// Classify `other` against this volume.
    ///
    /// Pairs without a direct implementation are answered by asking `other`
    /// about `self` and returning that result unchanged.
    pub fn test(self, other: BoundingVolume<'_>) -> TestResult {
        let this = self.kind() as usize;
        let that = other.kind() as usize;
        if let Some(direct) = DISPATCH[this][that] {
            return direct(self, other);
        }
        if let Some(mirrored) = DISPATCH[that][this] {
            return mirrored(other, self);
        }
        debug_assert!(false, "No classification for {:?} vs {:?}", self.kind(), other.kind());
        TestResult::PartiallyInside
    }

    /// Exact point containment
    pub fn is_position_inside(&self, pos: Vec3) -> bool {
        match self {
            Self::Sphere(sphere) => sphere.is_position_inside(pos),
            Self::Box(aabb) => aabb.is_position_inside(pos),
            Self::Convex(convex) => convex.is_position_inside(pos),
        }
    }
}

impl<'a> From<&'a BoundingSphere> for BoundingVolume<'a> {
    fn from(sphere: &'a BoundingSphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl<'a> From<&'a BoundingBox> for BoundingVolume<'a> {
    fn from(aabb: &'a BoundingBox) -> Self {
        Self::Box(aabb)
    }
}

impl<'a> From<&'a BoundingConvex> for BoundingVolume<'a> {
    fn from(convex: &'a BoundingConvex) -> Self {
        Self::Convex(convex)
    }
}

fn sphere_vs_sphere(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) => a.test_sphere(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}

fn box_vs_sphere(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Box(a), BoundingVolume::Sphere(b)) => a.test_sphere(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}

fn box_vs_box(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Box(a), BoundingVolume::Box(b)) => a.test_box(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}

fn convex_vs_sphere(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Convex(a), BoundingVolume::Sphere(b)) => a.test_sphere(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}

fn convex_vs_box(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Convex(a), BoundingVolume::Box(b)) => a.test_box(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}

fn convex_vs_convex(this: BoundingVolume<'_>, other: BoundingVolume<'_>) -> TestResult {
    match (this, other) {
        (BoundingVolume::Convex(a), BoundingVolume::Convex(b)) => a.test_convex(b),
        _ => unreachable!("dispatch table entry mismatch"),
    }
}
