//! # Mediator Configuration
//!
//! Serializable settings used to assemble a mediator's policy and store.
//! The binary reads this from a JSON file and overlays CLI flags on top.

use crate::error::{MediatorError, StoreError};
use crate::policy::{AdmissionPolicy, AllowAll, DEFAULT_DENIED_SUBSTRING, DenySubstring};
use crate::store::{LruStore, MemoStore, MemoryStore, RedbStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for building an [`AccessMediator`](crate::AccessMediator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediatorConfig {
    /// Keys containing any of these substrings are denied.
    pub deny_substrings: Vec<String>,

    /// Admit every key, ignoring `deny_substrings`.
    pub allow_all: bool,

    /// Bound the memo table with LRU eviction. `None` keeps it unbounded.
    pub capacity: Option<usize>,

    /// Persist the memo table in a redb database at this path.
    /// Takes precedence over `capacity`.
    pub db_path: Option<PathBuf>,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            deny_substrings: vec![DEFAULT_DENIED_SUBSTRING.to_string()],
            allow_all: false,
            capacity: None,
            db_path: None,
        }
    }
}

impl MediatorConfig {
    /// Check the settings without building anything.
    ///
    /// An empty deny substring is rejected: it would match every key.
    pub fn validate(&self) -> Result<(), MediatorError> {
        if self.deny_substrings.iter().any(String::is_empty) {
            return Err(MediatorError::InvalidArgument(
                "deny substrings must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the admission policy described by this config.
    pub fn policy(&self) -> Result<Box<dyn AdmissionPolicy>, MediatorError> {
        self.validate()?;
        if self.allow_all {
            Ok(Box::new(AllowAll))
        } else {
            Ok(Box::new(DenySubstring::any_of(
                self.deny_substrings.iter().cloned(),
            )))
        }
    }

    /// Build the memo store described by this config.
    pub fn store(&self) -> Result<Box<dyn MemoStore>, StoreError> {
        if let Some(path) = &self.db_path {
            return Ok(Box::new(RedbStore::open(path)?));
        }
        match self.capacity {
            Some(0) => Err(StoreError::Capacity(0)),
            Some(capacity) => Ok(Box::new(LruStore::new(capacity))),
            None => Ok(Box::new(MemoryStore::new())),
        }
    }
}
