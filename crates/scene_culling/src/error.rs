//! Error types for construction-time misuse
//!
//! Per-frame queries never fail; these are only returned when a frustum or
//! the scene graph is being built or rewired with inconsistent input.

use thiserror::Error;

use crate::foundation::collections::MovableId;

/// Errors raised while building or combining view frustums
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrustumError {
    /// Camera basis vectors are not mutually perpendicular or not unit length
    #[error("Camera basis is not orthonormal: {0}")]
    NonOrthonormalBasis(String),

    /// The frustum polygon needs at least three vertices
    #[error("Frustum polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Near plane must be in front of far plane
    #[error("Near plane ({near}) must be closer than far plane ({far})")]
    NearNotBeforeFar {
        /// Near distance
        near: f32,
        /// Far distance
        far: f32,
    },

    /// Only frustums sharing an apex can be intersected
    #[error("Unable to intersect view frustums with different positions")]
    PositionMismatch,
}

/// Errors raised by scene-graph structure changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not refer to a live movable
    #[error("Movable not found: {0:?}")]
    UnknownMovable(MovableId),

    /// Attaching would make a movable its own ancestor
    #[error("Setting {parent:?} as parent of {child:?} would form a parent loop")]
    ParentLoop {
        /// Movable being attached
        child: MovableId,
        /// Requested parent
        parent: MovableId,
    },

    /// Movables must be empty before they are destroyed
    #[error("Unable to destroy {0:?} because it has children")]
    HasChildren(MovableId),
}
