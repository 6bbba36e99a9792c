//! Unbounded in-memory memo table.

use super::MemoStore;
use crate::error::StoreError;
use std::collections::BTreeMap;

/// Append-only memo table with no eviction.
///
/// Grows for the lifetime of the mediator.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoStore for MemoryStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn peek(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn insert_if_absent(&mut self, key: &str, value: String) -> Result<String, StoreError> {
        Ok(self
            .entries
            .entry(key.to_string())
            .or_insert(value)
            .clone())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
