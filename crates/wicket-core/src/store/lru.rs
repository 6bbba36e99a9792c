//! # Bounded LRU Memo Table
//!
//! Least-recently-used eviction driven by a logical clock.
//!
//! ## Design Principles
//!
//! - BTreeMap storage for deterministic iteration
//! - Integer logical clock (monotonic counter), not wall time
//! - Recency index keyed by timestamp, so the eviction victim is the
//!   first entry of the index

use super::MemoStore;
use crate::error::StoreError;
use std::collections::BTreeMap;
use tracing::trace;

// =============================================================================
// CACHE ENTRY
// =============================================================================

/// An entry in the LRU cache.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// Logical timestamp of the last access; key into the recency index.
    last_access: u64,
}

// =============================================================================
// LRU CACHE
// =============================================================================

/// Generic LRU cache with a logical clock.
#[derive(Debug, Clone)]
pub struct LruCache<K: Ord + Clone, V> {
    entries: BTreeMap<K, Entry<V>>,

    /// Recency index: last_access -> key. Timestamps are unique.
    recency: BTreeMap<u64, K>,

    capacity: usize,
    logical_clock: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Ord + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            recency: BTreeMap::new(),
            capacity: capacity.max(1),
            logical_clock: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.logical_clock = self.logical_clock.saturating_add(1);
        self.logical_clock
    }

    /// Get a value, refreshing its recency on hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.recency.remove(&entry.last_access);
                self.recency.insert(now, key.clone());
                entry.last_access = now;
                self.hits = self.hits.saturating_add(1);
                Some(&entry.value)
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Get a value without touching recency or statistics.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Insert or replace a value, evicting the LRU entry if full.
    ///
    /// Returns the evicted key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let now = self.tick();

        if let Some(entry) = self.entries.get_mut(&key) {
            self.recency.remove(&entry.last_access);
            self.recency.insert(now, key);
            entry.value = value;
            entry.last_access = now;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_one()
        } else {
            None
        };

        self.recency.insert(now, key.clone());
        self.entries.insert(
            key,
            Entry {
                value,
                last_access: now,
            },
        );
        evicted
    }

    fn evict_one(&mut self) -> Option<K> {
        let (_, victim) = self.recency.pop_first()?;
        self.entries.remove(&victim);
        self.evictions = self.evictions.saturating_add(1);
        Some(victim)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, e)| (k, &e.value))
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> LruStats {
        LruStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}

/// Statistics about an LRU cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

// =============================================================================
// LRU MEMO STORE
// =============================================================================

/// Bounded memo table.
#[derive(Debug, Clone)]
pub struct LruStore {
    cache: LruCache<String, String>,
}

impl LruStore {
    /// Create a store holding at most `capacity` responses.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Underlying cache statistics.
    #[must_use]
    pub fn stats(&self) -> LruStats {
        self.cache.stats()
    }
}

impl MemoStore for LruStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.get(&key.to_string()).cloned())
    }

    fn peek(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.peek(&key.to_string()).cloned())
    }

    fn insert_if_absent(&mut self, key: &str, value: String) -> Result<String, StoreError> {
        let owned = key.to_string();
        if let Some(existing) = self.cache.peek(&owned) {
            return Ok(existing.clone());
        }
        if let Some(evicted) = self.cache.insert(owned, value.clone()) {
            trace!(evicted = %evicted, "lru eviction");
        }
        Ok(value)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.cache.len())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .cache
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn backend(&self) -> &'static str {
        "lru"
    }
}

// =============================================================================
// TESTS
// =============================================================================
