//! # Culling Configuration
//!
//! Settings for building camera frustums and for the diagnostic meshes
//! generated from convex regions. Loadable from TOML or RON through the
//! [`Config`] trait.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// # Camera Configuration
///
/// Field of view and clipping distances used by
/// [`ViewFrustum::from_config`](crate::spatial::ViewFrustum::from_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Horizontal field of view in degrees
    pub fov_x_degrees: f32,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Distance of the near plane, if any
    pub near: Option<f32>,
    /// Distance of the far plane, if any
    pub far: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_x_degrees: 90.0,
            fov_y_degrees: 60.0,
            near: Some(0.1),
            far: None,
        }
    }
}

impl CameraConfig {
    /// Check ranges before the values reach frustum construction
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, fov) in [("fov_x_degrees", self.fov_x_degrees), ("fov_y_degrees", self.fov_y_degrees)] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(ConfigError::Invalid(format!("{name} must be in (0, 180), got {fov}")));
            }
        }
        if let (Some(near), Some(far)) = (self.near, self.far) {
            if near >= far {
                return Err(ConfigError::Invalid(format!("near ({near}) must be less than far ({far})")));
            }
        }
        Ok(())
    }
}

/// # Debug Mesh Configuration
///
/// Controls how [`BoundingConvex::create_mesh`](crate::spatial::BoundingConvex::create_mesh)
/// renders endless edges and which triangles count as degenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugMeshConfig {
    /// How far endless edges are extended
    pub endless_edge_extent: f32,
    /// Triangles whose unnormalized normal is shorter than this are skipped
    pub min_triangle_normal: f32,
}

impl Default for DebugMeshConfig {
    fn default() -> Self {
        Self {
            endless_edge_extent: 1000.0,
            min_triangle_normal: 0.00001,
        }
    }
}

/// # Culling Configuration
///
/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Camera frustum settings
    pub camera: CameraConfig,
    /// Diagnostic mesh settings
    pub debug_mesh: DebugMeshConfig,
}

impl Config for CullingConfig {}

impl CullingConfig {
    /// Load and validate a configuration file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        log::debug!("Loaded culling config from {path}");
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        if self.debug_mesh.endless_edge_extent <= 0.0 {
            return Err(ConfigError::Invalid("endless_edge_extent must be positive".to_string()));
        }
        Ok(())
    }
}
