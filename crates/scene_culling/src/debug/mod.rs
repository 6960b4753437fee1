//! Diagnostic geometry
//!
//! Meshes produced here are for visualising culling volumes, not for
//! rendering scene content.

pub mod convex_mesh;

pub use convex_mesh::{ConvexMesh, MeshTriangle};
