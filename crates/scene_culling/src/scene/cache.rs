//! Lazily recomputed values and the absolute transform state

/// A value plus a flag telling whether it may be read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache<T> {
    value: T,
    valid: bool,
}

impl<T> Cache<T> {
    /// Cache holding `value`, marked stale
    pub fn stale(value: T) -> Self {
        Self { value, valid: false }
    }

    /// True if the stored value is current
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Mark the stored value stale
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Store a fresh value
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.valid = true;
    }

    /// Current value. Reading a stale cache is a caller bug.
    pub fn get(&self) -> &T {
        debug_assert!(self.valid, "Cached value is not up to date");
        &self.value
    }

    /// Stored value regardless of validity
    pub fn peek(&self) -> &T {
        &self.value
    }
}

/// Whether a movable's absolute transform can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformState {
    /// Valid here and in every visible descendant
    Yes,
    /// Needs recomputation
    #[default]
    No,
    /// Valid here, but some visible descendant needs recomputation
    NoForChildren,
}

impl TransformState {
    /// True unless the transform itself is stale
    pub fn is_readable(self) -> bool {
        self != Self::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lifecycle() {
        let mut cache = Cache::stale(0_u32);
        assert!(!cache.is_valid());
        cache.set(7);
        assert!(cache.is_valid());
        assert_eq!(*cache.get(), 7);
        cache.invalidate();
        assert!(!cache.is_valid());
        assert_eq!(*cache.peek(), 7);
    }

    #[test]
    fn test_transform_state_readability() {
        assert_eq!(TransformState::default(), TransformState::No);
        assert!(TransformState::Yes.is_readable());
        assert!(TransformState::NoForChildren.is_readable());
        assert!(!TransformState::No.is_readable());
    }
}
