//! Bounding volumes and frustums
//!
//! Provides the sphere, box and convex volumes used for visibility
//! classification, and the view frustums built on top of them.

mod bounding_box;
mod bounding_convex;
mod bounding_sphere;
mod bounding_volume;
mod view_frustum;

pub use bounding_box::BoundingBox;
pub use bounding_convex::{BoundingConvex, Cutplane, Edge};
pub use bounding_sphere::BoundingSphere;
pub use bounding_volume::{BoundingVolume, TestResult, VolumeKind};
pub use view_frustum::{FrustumKind, ViewFrustum};
