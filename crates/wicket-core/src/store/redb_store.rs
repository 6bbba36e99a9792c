//! # Redb Memo Store
//!
//! Durable memo table. Responses written here survive process restarts,
//! so a restarted mediator answers previously seen keys without
//! constructing its delegate.
//!
//! Uses redb for:
//! - ACID transactions (check-then-insert runs in one write transaction)
//! - Crash safety (copy-on-write B-trees)

use super::MemoStore;
use crate::error::StoreError;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Table holding key -> response.
const MEMO_TABLE: TableDefinition<&str, &str> = TableDefinition::new("memo");

/// Memo table stored in a redb database file.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RedbStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(redb::Error::from)?;

        // Create the table up front so read transactions never miss it.
        Self::ensure_table(&db)?;

        debug!(path = %path.display(), "redb memo store opened");
        Ok(Self { db, path })
    }

    fn ensure_table(db: &Database) -> Result<(), redb::Error> {
        let txn = db.begin_write()?;
        {
            txn.open_table(MEMO_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MEMO_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    fn write_if_absent(&self, key: &str, value: String) -> Result<String, redb::Error> {
        let txn = self.db.begin_write()?;
        let stored = {
            let mut table = txn.open_table(MEMO_TABLE)?;
            let existing = table.get(key)?.map(|guard| guard.value().to_string());
            match existing {
                Some(existing) => existing,
                None => {
                    table.insert(key, value.as_str())?;
                    value
                }
            }
        };
        txn.commit()?;
        Ok(stored)
    }

    fn count(&self) -> Result<usize, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MEMO_TABLE)?;
        Ok(table.len()? as usize)
    }

    fn all(&self) -> Result<Vec<(String, String)>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MEMO_TABLE)?;

        let mut entries = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }
}

impl MemoStore for RedbStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read(key)?)
    }

    fn peek(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read(key)?)
    }

    fn insert_if_absent(&mut self, key: &str, value: String) -> Result<String, StoreError> {
        Ok(self.write_if_absent(key, value)?)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.count()?)
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.all()?)
    }

    fn backend(&self) -> &'static str {
        "redb"
    }
}
