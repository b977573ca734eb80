//! Record storage abstraction.
//!
//! The catalog depends on an abstract key/value-tree store. The contract
//! is tree-aware rather than byte-oriented: the store traffics in whole
//! [`Form`]s and answers the handful of scans the catalog needs (fetch by
//! id, fetch by title, list-all for index rebuild, distinct values for a
//! set of paths). No query dialect is part of the contract.
//!
//! Writes are natural-key upserts: putting a record whose id already
//! exists replaces the stored form and reports [`WriteOutcome::Updated`]
//! instead of erroring. Whether the content actually changed is not
//! inspected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::form::Form;
use crate::id::RecordId;
use crate::path::Path;
use crate::schema::Standard;

/// A record as held by the store: identity, vocabulary and tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Record identifier (the natural key).
    pub id: RecordId,
    /// The standard the record's root type belongs to.
    pub standard: Standard,
    /// The record's tree representation.
    pub form: Form,
}

/// Outcome of a [`RecordStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The natural key was new.
    Inserted,
    /// The natural key already existed; the form was replaced.
    Updated,
}

/// Storage contract for catalog records.
///
/// Implementations must be safe to share across concurrently running
/// worker instances; writes are serialized by the implementation.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Fetches a record by id.
    async fn get(&self, id: &RecordId) -> Result<Option<StoredRecord>>;

    /// Fetches a record by its form title.
    ///
    /// Titles are not unique; the first match in id order is returned.
    async fn get_by_title(&self, title: &str) -> Result<Option<StoredRecord>>;

    /// Upserts a record by natural key.
    async fn put(&self, record: StoredRecord) -> Result<WriteOutcome>;

    /// Lists every stored record, in id order.
    ///
    /// Used for full index rebuilds; not intended for request paths.
    async fn list(&self) -> Result<Vec<StoredRecord>>;

    /// Returns the distinct leaf payloads found at any of `paths` across
    /// all records of `standard`, sorted and deduplicated.
    async fn distinct_values(&self, standard: Standard, paths: &[Path]) -> Result<Vec<String>>;
}

/// In-memory record store for tests and embedded use.
///
/// Thread-safe via `RwLock`. Not suitable for production corpora.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<RecordId, StoredRecord>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<RecordId, StoredRecord>>> {
        self.records.read().map_err(|_| Error::Internal {
            message: "record store lock poisoned".into(),
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: &RecordId) -> Result<Option<StoredRecord>> {
        Ok(self.read_guard()?.get(id).cloned())
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<StoredRecord>> {
        Ok(self
            .read_guard()?
            .values()
            .find(|r| r.form.title == title)
            .cloned())
    }

    async fn put(&self, record: StoredRecord) -> Result<WriteOutcome> {
        let mut records = self.records.write().map_err(|_| Error::Internal {
            message: "record store lock poisoned".into(),
        })?;
        let outcome = if records.contains_key(&record.id) {
            WriteOutcome::Updated
        } else {
            WriteOutcome::Inserted
        };
        records.insert(record.id.clone(), record);
        Ok(outcome)
    }

    async fn list(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.read_guard()?.values().cloned().collect())
    }

    async fn distinct_values(&self, standard: Standard, paths: &[Path]) -> Result<Vec<String>> {
        let records = self.read_guard()?;
        let mut values: Vec<String> = records
            .values()
            .filter(|r| r.standard == standard)
            .flat_map(|r| {
                paths
                    .iter()
                    .flat_map(|p| r.form.leaf_payloads_at(p))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }
}
