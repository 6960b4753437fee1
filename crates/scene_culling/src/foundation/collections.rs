//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational handle of a movable inside a [`crate::scene::SceneGraph`]
    pub struct MovableId;
}

/// Handle-based arena for scene-graph nodes
pub type MovableArena<T> = SlotMap<MovableId, T>;
