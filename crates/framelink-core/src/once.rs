//! At-most-once registry keyed by string.

use std::collections::HashSet;

/// Remembers which keys have been seen.
///
/// Owned by whoever needs the behaviour (one per provider, one per error
/// reporter), so independent instances never share state.
#[derive(Debug, Clone, Default)]
pub struct OnceSet {
    seen: HashSet<String>,
}

impl OnceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`. Returns `true` only the first time.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.seen.insert(key.into())
    }

    /// Whether `key` has been seen.
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Number of keys seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no key has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
