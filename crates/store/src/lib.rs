//! Persistence/search collaborator for the Aegis pipeline.
//!
//! The pipeline treats persistence as an eventually-consistent
//! key/value+search store holding freeform text payloads: consultation
//! patterns, rollback requests, and notification records survive restarts by
//! being re-parsed from here, and individually malformed records are skipped
//! by their loaders rather than failing the load.

#![deny(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// One stored record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Category namespace (e.g. "consultation_pattern").
    pub category: String,
    /// Key within the category; storing again under the same key replaces
    /// the record.
    pub key: String,
    /// Freeform text payload, re-parsed by the owning loader.
    pub payload: String,
    /// Small string metadata bag.
    pub metadata: HashMap<String, String>,
    /// When the record was last stored.
    pub stored_at: DateTime<Utc>,
}

/// Trait for the persistence/search backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store (or replace) a record.
    async fn store_record(
        &self,
        category: &str,
        key: &str,
        payload: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError>;

    /// Search records in a category whose key or payload contains `query`
    /// (case-insensitive). An empty query returns the whole category.
    async fn search_records(
        &self,
        category: &str,
        query: &str,
    ) -> Result<Vec<StoredRecord>, StoreError>;
}

/// In-memory record store for testing and development.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<(String, String), StoredRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records across all categories.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock not poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn store_record(
        &self,
        category: &str,
        key: &str,
        payload: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let record = StoredRecord {
            category: category.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
            metadata,
            stored_at: Utc::now(),
        };
        self.records
            .write()
            .expect("lock not poisoned")
            .insert((category.to_string(), key.to_string()), record);
        Ok(())
    }

    async fn search_records(
        &self,
        category: &str,
        query: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let needle = query.to_ascii_lowercase();
        let records = self.records.read().expect("lock not poisoned");
        let mut matches: Vec<StoredRecord> = records
            .values()
            .filter(|r| r.category == category)
            .filter(|r| {
                needle.is_empty()
                    || r.key.to_ascii_lowercase().contains(&needle)
                    || r.payload.to_ascii_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        // Deterministic order for callers that iterate.
        matches.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(matches)
    }
}

/// A store that always fails, for exercising degraded-persistence paths.
pub struct FailingRecordStore;

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn store_record(
        &self,
        _category: &str,
        _key: &str,
        _payload: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("simulated store failure".into()))
    }

    async fn search_records(
        &self,
        _category: &str,
        _query: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        Err(StoreError::Backend("simulated store failure".into()))
    }
}
