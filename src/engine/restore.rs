// Restore planning - a guarded, report-only dry run.
//
// Applying a restore is deliberately not implemented by this engine. A plan
// carries everything an external, separately-authorized two-phase tool needs;
// keeping the apply step out of the engine's automatic paths is the safety
// measure, not an omission.

use tracing::info;

use super::snapshot::decode_envelope;
use super::BackupEngine;
use crate::types::{RestorePlan, TableRestorePlan};
use crate::{Result, VaultError};

impl BackupEngine {
    /// Load a snapshot's artifact and report which tables and how many rows
    /// a restore *would* write, without mutating any business data.
    ///
    /// `tables` restricts the plan to a subset; `None` plans every table the
    /// snapshot exported. Requested tables absent from the artifact are
    /// listed under `missing_tables`.
    pub async fn plan_restore(
        &self,
        snapshot_id: &str,
        tables: Option<&[String]>,
    ) -> Result<RestorePlan> {
        let snapshot = self
            .store()
            .get_snapshot(snapshot_id)
            .await?
            .ok_or_else(|| VaultError::SnapshotNotFound(snapshot_id.to_string()))?;

        let artifact = self.blobs().get(&snapshot.file_path).await?;
        let envelope = decode_envelope(&artifact)?;

        let requested: Vec<String> = match tables {
            Some(subset) => subset.to_vec(),
            None => envelope.manifest.tables.clone(),
        };

        let mut plans = Vec::new();
        let mut missing_tables = Vec::new();
        let mut total_records = 0u64;

        for table in requested {
            match envelope.tables.get(&table) {
                Some(rows) => {
                    total_records += rows.len() as u64;
                    plans.push(TableRestorePlan {
                        table,
                        records: rows.len() as u64,
                    });
                }
                None => missing_tables.push(table),
            }
        }

        info!(
            snapshot_id = %snapshot_id,
            tables = plans.len(),
            total_records,
            "restore plan computed; applying it is out of scope for this engine"
        );

        Ok(RestorePlan {
            snapshot_id: snapshot.snapshot_id,
            description: snapshot.description,
            created_at: snapshot.timestamp,
            tables: plans,
            missing_tables,
            total_records,
        })
    }
}
