//! Blob store - compressed snapshot artifacts.
//!
//! One artifact per snapshot, keyed deterministically by snapshot id. The
//! engine writes and reads artifacts but never deletes them; [`BlobStore::delete`]
//! exists for out-of-band pruning tools only.

mod fs;
mod memory;

pub use fs::FileBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a blob store backend
#[derive(Error, Debug)]
pub enum BlobError {
    /// No artifact under the requested key
    #[error("blob not found: {0}")]
    NotFound(String),

    /// Read/write failed at the storage layer
    #[error("blob io failure: {0}")]
    Io(String),
}

/// Storage for snapshot artifacts
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist an artifact under `key`, replacing any previous content
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Fetch the artifact stored under `key`
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Remove the artifact under `key`. Never called by the engine itself;
    /// snapshot pruning is an explicit, manual action.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Total bytes held across all artifacts
    async fn total_size(&self) -> Result<u64, BlobError>;
}
