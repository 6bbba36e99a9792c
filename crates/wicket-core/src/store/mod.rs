//! # Store Module
//!
//! Memo tables mapping request keys to delegate responses.
//!
//! Three backends:
//! - [`MemoryStore`]: unbounded, append-only (the default)
//! - [`LruStore`]: bounded, least-recently-used eviction
//! - [`RedbStore`]: durable, backed by a redb database file
//!
//! All writes go through [`MemoStore::insert_if_absent`] so the first
//! response stored for a key is the one every caller sees.

mod lru;
mod memory;
mod redb_store;

pub use lru::{LruCache, LruStats, LruStore};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::error::StoreError;

/// A key -> response memo table.
pub trait MemoStore: Send {
    /// Look up a key, recording the access (LRU stores refresh recency).
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError>;

    /// Look up a key without recording the access.
    fn peek(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key` unless a value is already present.
    ///
    /// Returns the value held by the store after the call: `value` if it was
    /// inserted, the existing value otherwise.
    fn insert_if_absent(&mut self, key: &str, value: String) -> Result<String, StoreError>;

    /// Number of entries.
    fn len(&self) -> Result<usize, StoreError>;

    /// Check if the store has no entries.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// All entries, ordered by key.
    fn entries(&self) -> Result<Vec<(String, String)>, StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Behaviour every backend must share.
    fn exercise(store: &mut dyn MemoStore) {
        assert_eq!(store.get("alpha").ok().flatten(), None);
        assert_eq!(store.is_empty().ok(), Some(true));

        let stored = store.insert_if_absent("alpha", "one".to_string());
        assert_eq!(stored.ok().as_deref(), Some("one"));

        // Second write loses.
        let stored = store.insert_if_absent("alpha", "two".to_string());
        assert_eq!(stored.ok().as_deref(), Some("one"));

        assert_eq!(store.get("alpha").ok().flatten().as_deref(), Some("one"));
        assert_eq!(store.peek("alpha").ok().flatten().as_deref(), Some("one"));

        let _ = store.insert_if_absent("beta", "b".to_string());
        assert_eq!(store.len().ok(), Some(2));

        let entries = store.entries().ok().unwrap_or_default();
        assert_eq!(
            entries,
            vec![
                ("alpha".to_string(), "one".to_string()),
                ("beta".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn memory_store_contract() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn lru_store_contract() {
        exercise(&mut LruStore::new(10));
    }

    #[test]
    fn redb_store_contract() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = RedbStore::open(dir.path().join("memo.redb")).expect("open redb");
        exercise(&mut store);
    }
}
