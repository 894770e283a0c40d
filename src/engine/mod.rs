// Backup engine - the service object wiring the backup store, blob store,
// and record provider together.
//
// Constructed once at startup and passed by handle into every collaborator
// that mutates tracked tables; there is no ambient global instance.

mod history;
mod restore;
mod retention;
mod snapshot;
mod stats;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::blob::BlobStore;
use crate::hash;
use crate::ident;
use crate::provider::RecordProvider;
use crate::store::BackupStore;
use crate::types::{BackupRecord, Operation, RowData};
use crate::{Result, VaultError};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tables included in snapshots
    pub tracked_tables: Vec<String>,
    /// Bound on id regeneration after duplicate-key collisions
    pub id_retry_attempts: u32,
    /// Pause between id retries
    pub id_retry_backoff: Duration,
    /// gzip level for snapshot artifacts (0-9)
    pub compression_level: u32,
    /// Prefix of generated snapshot ids
    pub snapshot_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracked_tables: Vec::new(),
            id_retry_attempts: 3,
            id_retry_backoff: Duration::from_millis(1),
            compression_level: 6,
            snapshot_prefix: "snapshot".to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the tables included in snapshots
    pub fn with_tracked_tables(mut self, tables: Vec<String>) -> Self {
        self.tracked_tables = tables;
        self
    }

    /// Set the id collision retry bound
    pub fn with_id_retry_attempts(mut self, attempts: u32) -> Self {
        self.id_retry_attempts = attempts.max(1);
        self
    }

    /// Set the artifact compression level (clamped to 9)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }
}

/// Record-level backup and snapshot engine.
///
/// `log_change` is synchronous from the caller's perspective: callers await
/// its success before committing the business mutation, which is what makes
/// a failed mutation recoverable ("log-then-mutate"). Snapshot creation and
/// retention cleanup are the only unbounded-duration operations; wrap them
/// in `tokio::time::timeout` when a caller-supplied deadline is needed.
pub struct BackupEngine {
    store: Arc<dyn BackupStore>,
    blobs: Arc<dyn BlobStore>,
    provider: Arc<dyn RecordProvider>,
    config: EngineConfig,
}

impl BackupEngine {
    /// Build an engine from its injected dependencies
    pub fn new(
        store: Arc<dyn BackupStore>,
        blobs: Arc<dyn BlobStore>,
        provider: Arc<dyn RecordProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            provider,
            config,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn BackupStore {
        self.store.as_ref()
    }

    pub(crate) fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    pub(crate) fn provider(&self) -> &dyn RecordProvider {
        self.provider.as_ref()
    }

    /// Current time as epoch seconds with sub-second precision
    pub(crate) fn now_epoch() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }

    /// Append one backup record for a pending mutation and return its id.
    ///
    /// Call this *before* committing the mutation itself. The payload shape
    /// is normalized rather than validated: inserts keep only `new_data`,
    /// deletes only `old_data`; updates carry whatever the caller captured
    /// (best-effort, absence of either side is tolerated).
    ///
    /// Id collisions reported by the store as a typed duplicate-key error
    /// trigger regeneration, bounded by the configured retry limit.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_change(
        &self,
        table: &str,
        record_id: i64,
        operation: Operation,
        old_data: Option<RowData>,
        new_data: Option<RowData>,
        user_id: Option<&str>,
        source: &str,
    ) -> Result<String> {
        let (old_data, new_data) = match operation {
            Operation::Insert => (None, new_data),
            Operation::Delete => (old_data, None),
            Operation::Update => (old_data, new_data),
        };

        let content_hash = hash::content_hash(old_data.as_ref().or(new_data.as_ref()))?;

        let mut record = BackupRecord {
            backup_id: String::new(),
            table_name: table.to_string(),
            record_id,
            operation,
            old_data,
            new_data,
            timestamp: Self::now_epoch(),
            user_id: user_id.map(str::to_string),
            source: source.to_string(),
            content_hash,
        };

        let attempts = self.config.id_retry_attempts;
        for attempt in 1..=attempts {
            record.backup_id = ident::new_backup_id();

            match self.store.append_record(&record).await {
                Ok(()) => {
                    debug!(
                        backup_id = %record.backup_id,
                        table = %record.table_name,
                        record_id = record.record_id,
                        operation = %record.operation,
                        "backup record appended"
                    );
                    return Ok(record.backup_id);
                }
                Err(crate::store::StoreError::DuplicateKey(id)) if attempt < attempts => {
                    warn!(
                        backup_id = %id,
                        attempt,
                        "backup id collision, regenerating"
                    );
                    tokio::time::sleep(self.config.id_retry_backoff).await;
                }
                Err(crate::store::StoreError::DuplicateKey(_)) => {
                    return Err(VaultError::BackupIdExhausted(attempts));
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(VaultError::BackupIdExhausted(attempts))
    }

    /// Capture the current row through the record provider as `old_data`,
    /// then log the pending change.
    ///
    /// This is the integration path for callers that do not already hold the
    /// pre-change state: updates and deletes fetch the live row first;
    /// inserts skip the fetch since there is nothing to capture yet.
    pub async fn capture_before_change(
        &self,
        table: &str,
        record_id: i64,
        operation: Operation,
        new_data: Option<RowData>,
        user_id: Option<&str>,
        source: &str,
    ) -> Result<String> {
        let old_data = match operation {
            Operation::Insert => None,
            Operation::Update | Operation::Delete => {
                self.provider.fetch_row(table, record_id).await?
            }
        };

        self.log_change(table, record_id, operation, old_data, new_data, user_id, source)
            .await
    }
}
