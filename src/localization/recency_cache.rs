//! Bounded least-recently-used cache for a handful of entries.
//!
//! Relocalization caches hold very few entries (3 by default) of large values, so a
//! recency-ordered `VecDeque` scanned linearly is all that is needed: the front is the most
//! recently used entry, the back is the next one evicted.
use std::collections::VecDeque;

/// Hit/miss/eviction counters of a [`RecencyCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone)]
pub struct RecencyCache<K, V> {
    capacity: usize,
    entries: VecDeque<(K, V)>,
    stats: CacheStats,
}

impl<K: PartialEq, V: Clone> RecencyCache<K, V> {
    /// Create a cache keeping at most `capacity` entries (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        RecencyCache {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up `key`, marking it as most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(position)?;
        let value = entry.1.clone();
        self.entries.push_front(entry);
        Some(value)
    }

    /// Insert `key` as the most recently used entry, evicting the least recently used one
    /// when full. Returns the evicted key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        if let Some(position) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(position);
        }
        self.entries.push_front((key, value));

        if self.entries.len() > self.capacity {
            self.stats.evictions += 1;
            return self.entries.pop_back().map(|(k, _)| k);
        }
        None
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// `compute` only runs on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            self.stats.hits += 1;
            return value;
        }

        self.stats.misses += 1;
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
