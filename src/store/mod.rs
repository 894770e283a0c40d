//! Backup store - append-only records and snapshot metadata.
//!
//! Two backends ship: [`MemoryBackupStore`] for tests and embedded use, and
//! [`PostgresBackupStore`] for production. Both classify duplicate-key
//! violations as a typed [`StoreError::DuplicateKey`] so the engine's id
//! retry logic never has to parse backend error messages.

mod memory;
pub mod postgres;

pub use memory::MemoryBackupStore;
pub use postgres::{PostgresBackupStore, PostgresConfig};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{BackupRecord, Snapshot};

/// Errors surfaced by a backup store backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Insert violated a uniqueness constraint (backup or snapshot id)
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Read/write/delete failed at the storage layer
    #[error("storage io failure: {0}")]
    Io(String),

    /// A stored row could not be encoded or decoded
    #[error("storage serialization failure: {0}")]
    Serialization(String),
}

/// Filter for history queries; present fields combine with AND semantics
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Restrict to one business table
    pub table_name: Option<String>,
    /// Restrict to one row id
    pub record_id: Option<i64>,
    /// Maximum number of records returned
    pub limit: usize,
}

impl HistoryFilter {
    /// Filter with only a result cap
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

/// Storage for backup records and snapshot metadata.
///
/// Backup records are append-only: implementations expose no per-record
/// update or delete, only the bulk retention path. Inserts must be atomic at
/// the row level so concurrent writers need no external lock.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Append one backup record. Fails with [`StoreError::DuplicateKey`] if
    /// the backup id is already present.
    async fn append_record(&self, record: &BackupRecord) -> Result<(), StoreError>;

    /// Query backup records, newest first, honoring the filter's AND
    /// semantics and limit.
    async fn query_history(&self, filter: &HistoryFilter) -> Result<Vec<BackupRecord>, StoreError>;

    /// Insert snapshot metadata. Fails with [`StoreError::DuplicateKey`] if
    /// the snapshot id is already present.
    async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Fetch snapshot metadata by id
    async fn get_snapshot(&self, snapshot_id: &str) -> Result<Option<Snapshot>, StoreError>;

    /// List snapshot metadata, newest first, capped at `limit`
    async fn list_snapshots(&self, limit: usize) -> Result<Vec<Snapshot>, StoreError>;

    /// Bulk-delete backup records with `timestamp < cutoff` (strict) and
    /// return how many were removed. Never touches snapshots.
    async fn delete_records_before(&self, cutoff: f64) -> Result<u64, StoreError>;

    /// Total backup records retained
    async fn count_records(&self) -> Result<u64, StoreError>;

    /// Backup records with `timestamp > since`
    async fn count_records_since(&self, since: f64) -> Result<u64, StoreError>;

    /// Total snapshots recorded
    async fn count_snapshots(&self) -> Result<u64, StoreError>;
}
