//! # Core Module
//!
//! Shared configuration types for the culling subsystems.
//!
//! ## Organization
//!
//! - **Config**: camera frustum and diagnostic mesh settings

pub mod config;

pub use config::{
    CullingConfig,
    CameraConfig,
    DebugMeshConfig,
    Config,
    ConfigError,
};
