//! Capacity-bounded map ordered by recency of use.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Bounded key/value store that evicts the least-recently-used entry.
///
/// `get` and `put` refresh recency; `has`, `peek` and iteration do not.
pub struct EvictionStore<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
}

impl<K: Hash + Eq, V> EvictionStore<K, V> {
    /// Create an empty store holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Look up `key` and mark it most-recently-used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Look up `key` without touching recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.peek(key)
    }

    /// Insert or overwrite `key` as most-recently-used.
    ///
    /// Returns the entry evicted to make room, if any. Overwriting an
    /// existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let existed = self.entries.contains(&key);
        let displaced = self.entries.push(key, value);
        if existed { None } else { displaced }
    }

    /// Remove `key`, reporting whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.entries.pop(key).is_some()
    }

    /// Membership check that leaves recency untouched.
    #[must_use]
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Visit entries from most- to least-recently-used.
    pub fn for_each(&self, mut visitor: impl FnMut(&K, &V)) {
        for (key, value) in &self.entries {
            visitor(key, value);
        }
    }

    /// Entries from most- to least-recently-used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.cap()
    }
}

impl<K: Hash + Eq + Clone, V> EvictionStore<K, V> {
    /// Remove every entry whose key matches `predicate`; returns how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|(key, _)| predicate(*key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.entries.pop(key);
        }
        doomed.len()
    }
}
