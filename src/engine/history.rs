// History queries - read-only, safe to run alongside concurrent writers.

use super::BackupEngine;
use crate::store::HistoryFilter;
use crate::types::{BackupRecord, Snapshot};
use crate::Result;

impl BackupEngine {
    /// Query backup records, newest first. Present filter arguments combine
    /// with AND semantics; the result is capped at `limit`.
    pub async fn get_history(
        &self,
        table_name: Option<&str>,
        record_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<BackupRecord>> {
        let filter = HistoryFilter {
            table_name: table_name.map(str::to_string),
            record_id,
            limit,
        };
        Ok(self.store().query_history(&filter).await?)
    }

    /// List snapshot metadata, newest first, capped at `limit`
    pub async fn get_snapshots(&self, limit: usize) -> Result<Vec<Snapshot>> {
        Ok(self.store().list_snapshots(limit).await?)
    }
}
