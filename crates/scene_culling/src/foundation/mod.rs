//! Building blocks shared by the spatial and scene modules
//!
//! - [`math`]: nalgebra aliases, [`math::Transform`] and [`math::Plane`]
//! - [`collections`]: generational movable handles
//! - [`logging`]: `log` re-exports and logger setup

pub mod collections;
pub mod logging;
pub mod math;
