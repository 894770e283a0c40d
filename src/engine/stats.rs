// Usage statistics - pure aggregation, no side effects.

use super::BackupEngine;
use crate::types::VaultStats;
use crate::Result;

impl BackupEngine {
    /// Aggregate counts and storage usage across the backup and blob stores
    pub async fn get_stats(&self) -> Result<VaultStats> {
        let day_ago = Self::now_epoch() - 86_400.0;

        let total_backups = self.store().count_records().await?;
        let total_snapshots = self.store().count_snapshots().await?;
        let recent_backups_24h = self.store().count_records_since(day_ago).await?;
        let storage_used_bytes = self.blobs().total_size().await?;

        Ok(VaultStats {
            total_backups,
            total_snapshots,
            recent_backups_24h,
            storage_used_bytes,
        })
    }
}
