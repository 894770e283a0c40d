// Retention cleanup - the only path that removes backup records.

use tracing::info;

use super::BackupEngine;
use crate::Result;

const SECONDS_PER_DAY: f64 = 86_400.0;

impl BackupEngine {
    /// Bulk-delete backup records older than `days` days and return how many
    /// were removed.
    ///
    /// The cutoff comparison is strict: a record stamped exactly at
    /// `now - days` is retained. Idempotent - a second run with no new data
    /// deletes nothing. Snapshots are never deleted here; pruning them is an
    /// explicit manual action.
    pub async fn cleanup_older_than(&self, days: u32) -> Result<u64> {
        let cutoff = Self::now_epoch() - days as f64 * SECONDS_PER_DAY;
        let deleted = self.store().delete_records_before(cutoff).await?;

        info!(days, deleted, "retention cleanup completed");
        Ok(deleted)
    }
}
