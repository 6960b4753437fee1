//! # Scene Culling
//!
//! Visibility culling core for a real-time 3D renderer.
//!
//! ## Features
//!
//! - **Bounding Volumes**: spheres, axis-aligned boxes and convex regions with
//!   conservative pairwise classification
//! - **View Frustums**: camera frustums built as convex regions, with `All`
//!   and `Empty` fast paths and frustum intersection
//! - **Scene Graph**: movables with lazily propagated absolute transforms and
//!   aggregate bounding spheres
//! - **Visibility Gathering**: view and occlusion frustum traversal producing
//!   lit and unlit draw lists
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_culling::prelude::*;
//!
//! #[derive(Clone)]
//! struct Model {
//!     lit: bool,
//! }
//!
//! impl Renderable for Model {
//!     fn needs_light(&self) -> bool {
//!         self.lit
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = SceneGraph::new();
//!     let root = scene.create_movable();
//!     let ship = scene.create_movable();
//!     scene.set_parent(ship, Some(root))?;
//!     scene.set_position(ship, Vec3::new(0.0, 10.0, 0.0))?;
//!     scene.set_bounding_sphere(ship, BoundingSphere::new(Vec3::zeros(), 1.0))?;
//!     scene.add_renderable(ship, Model { lit: true })?;
//!
//!     scene.update_absolute_transform(root)?;
//!     scene.update_total_bounding_sphere(root)?;
//!
//!     let camera = ViewFrustum::from_config(
//!         Vec3::zeros(),
//!         Vec3::new(0.0, 1.0, 0.0),
//!         Vec3::new(0.0, 0.0, 1.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         &CameraConfig::default(),
//!     )?;
//!     let mut visibles = Visibles::new();
//!     scene.get_all_visibles(root, &mut visibles, &[camera], &[])?;
//!     assert_eq!(visibles.normal.len(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod debug;
pub mod error;
pub mod foundation;
pub mod scene;
pub mod spatial;

pub use error::{FrustumError, SceneError};

/// Common imports for culling users
pub mod prelude {
    pub use crate::{
        core::{CameraConfig, Config, CullingConfig, DebugMeshConfig},
        debug::ConvexMesh,
        error::{FrustumError, SceneError},
        foundation::{
            collections::MovableId,
            math::{Plane, Transform, Vec2, Vec3},
        },
        scene::{Renderable, SceneGraph, TransformState, Visibles},
        spatial::{BoundingBox, BoundingConvex, BoundingSphere, BoundingVolume, TestResult, ViewFrustum},
    };
}
