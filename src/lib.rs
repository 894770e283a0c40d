//! # Rowvault
//!
//! A record-level backup and snapshot engine that protects a mutable dataset
//! against destructive edits. Before any row in a tracked table is inserted,
//! updated, or deleted, the engine captures an immutable backup record
//! (before/after state, operation kind, actor, timestamp, integrity hash).
//! Independently it produces compressed full-dataset snapshots with export
//! statistics, and offers history querying, retention cleanup, restore
//! planning, and usage statistics.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use rowvault::engine::{BackupEngine, EngineConfig};
//! use rowvault::store::MemoryBackupStore;
//! use rowvault::blob::MemoryBlobStore;
//! use rowvault::provider::MemoryProvider;
//! use rowvault::types::Operation;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BackupEngine::new(
//!     Arc::new(MemoryBackupStore::new()),
//!     Arc::new(MemoryBlobStore::new()),
//!     Arc::new(MemoryProvider::new()),
//!     EngineConfig::default().with_tracked_tables(vec!["main_lipids".into()]),
//! );
//!
//! let mut old = rowvault::types::RowData::new();
//! old.insert("name".to_string(), json!("A"));
//! let mut new = rowvault::types::RowData::new();
//! new.insert("name".to_string(), json!("B"));
//!
//! let backup_id = engine
//!     .log_change("main_lipids", 42, Operation::Update, Some(old), Some(new), Some("u1"), "web_app")
//!     .await?;
//! assert_eq!(backup_id.len(), 16);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design
//!
//! The engine is an explicit service object: storage backends are injected as
//! trait objects ([`store::BackupStore`], [`blob::BlobStore`]) and the
//! surrounding application's data-access layer is reached through the narrow
//! [`provider::RecordProvider`] seam. The backup log is append-only; records
//! are only ever removed in bulk by retention cleanup. Snapshots are
//! best-effort consistent across tables (no distributed transaction is
//! assumed) and are never deleted by the engine itself.
//!
//! ## Modules
//!
//! - [`engine`]: the [`engine::BackupEngine`] service and its operations
//! - [`store`]: append-only backup record and snapshot metadata storage
//! - [`blob`]: compressed snapshot artifact storage
//! - [`provider`]: "fetch current rows" seam to the business tables
//! - [`types`]: records, snapshots, stats, and restore plans
//! - [`ident`]: collision-resistant backup identifier allocation
//! - [`hash`]: canonical serialization and truncated content hashing

#![warn(missing_docs)]

use thiserror::Error;

use crate::blob::BlobError;
use crate::provider::ProviderError;
use crate::store::StoreError;

/// Result type for rowvault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for rowvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Backup id collisions persisted past the retry bound
    #[error("backup id allocation exhausted after {0} attempts")]
    BackupIdExhausted(u32),

    /// Payload or envelope could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backup store append/read/delete failure
    #[error("backup store error: {0}")]
    Store(#[from] StoreError),

    /// Snapshot artifact read/write failure
    #[error("blob store error: {0}")]
    Blob(#[from] BlobError),

    /// Artifact compression failed while building a snapshot
    #[error("compression error: {0}")]
    Compression(String),

    /// Record provider failure outside a snapshot export
    #[error("record provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Unknown snapshot id
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// Artifact exists but is corrupt or carries an unsupported format
    #[error("invalid snapshot artifact: {0}")]
    InvalidSnapshot(String),
}

/// Backup engine service and operations
pub mod engine;

/// Append-only backup record and snapshot metadata storage
pub mod store;

/// Compressed snapshot artifact storage
pub mod blob;

/// External "fetch current row" collaborator seam
pub mod provider;

/// Core data model
pub mod types;

/// Backup identifier allocation
pub mod ident;

/// Canonical serialization and content hashing
pub mod hash;
