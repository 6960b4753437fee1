//! Scene graph with lazy transform propagation and visibility gathering

mod cache;
mod movable;
mod visibles;

pub use cache::{Cache, TransformState};
pub use movable::SceneGraph;
pub use visibles::{Renderable, Visibles};
