use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{BackupStore, HistoryFilter, StoreError};
use crate::types::{BackupRecord, Snapshot};

/// In-memory backup store.
///
/// Records and snapshots live in concurrent maps keyed by their ids, which
/// makes uniqueness enforcement a plain entry-occupancy check. Suited to
/// tests and single-process embedding; durability comes from the PostgreSQL
/// backend.
#[derive(Default)]
pub struct MemoryBackupStore {
    records: DashMap<String, BackupRecord>,
    snapshots: DashMap<String, Snapshot>,
}

impl MemoryBackupStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn append_record(&self, record: &BackupRecord) -> Result<(), StoreError> {
        match self.records.entry(record.backup_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(record.backup_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn query_history(&self, filter: &HistoryFilter) -> Result<Vec<BackupRecord>, StoreError> {
        let mut matches: Vec<BackupRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let record = entry.value();
                filter
                    .table_name
                    .as_ref()
                    .map_or(true, |t| &record.table_name == t)
                    && filter.record_id.map_or(true, |id| record.record_id == id)
            })
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| {
            b.timestamp
                .partial_cmp(&a.timestamp)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(filter.limit);
        Ok(matches)
    }

    async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        match self.snapshots.entry(snapshot.snapshot_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(snapshot.snapshot_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(snapshot.clone());
                Ok(())
            }
        }
    }

    async fn get_snapshot(&self, snapshot_id: &str) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.snapshots.get(snapshot_id).map(|e| e.value().clone()))
    }

    async fn list_snapshots(&self, limit: usize) -> Result<Vec<Snapshot>, StoreError> {
        let mut all: Vec<Snapshot> = self.snapshots.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| {
            b.timestamp
                .partial_cmp(&a.timestamp)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all.truncate(limit);
        Ok(all)
    }

    async fn delete_records_before(&self, cutoff: f64) -> Result<u64, StoreError> {
        let mut deleted = 0u64;
        self.records.retain(|_, record| {
            let keep = record.timestamp >= cutoff;
            if !keep {
                deleted += 1;
            }
            keep
        });
        Ok(deleted)
    }

    async fn count_records(&self) -> Result<u64, StoreError> {
        Ok(self.records.len() as u64)
    }

    async fn count_records_since(&self, since: f64) -> Result<u64, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.value().timestamp > since)
            .count() as u64)
    }

    async fn count_snapshots(&self) -> Result<u64, StoreError> {
        Ok(self.snapshots.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;

    fn record(backup_id: &str, table: &str, record_id: i64, timestamp: f64) -> BackupRecord {
        BackupRecord {
            backup_id: backup_id.to_string(),
            table_name: table.to_string(),
            record_id,
            operation: Operation::Update,
            old_data: None,
            new_data: None,
            timestamp,
            user_id: None,
            source: "web_app".to_string(),
            content_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_backup_id_is_typed() {
        let store = MemoryBackupStore::new();
        store.append_record(&record("aa", "t", 1, 1.0)).await.unwrap();

        let err = store.append_record(&record("aa", "t", 2, 2.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(id) if id == "aa"));
    }

    #[tokio::test]
    async fn history_filters_and_orders_descending() {
        let store = MemoryBackupStore::new();
        store.append_record(&record("a1", "main_lipids", 1, 10.0)).await.unwrap();
        store.append_record(&record("a2", "main_lipids", 1, 30.0)).await.unwrap();
        store.append_record(&record("a3", "main_lipids", 2, 20.0)).await.unwrap();
        store.append_record(&record("a4", "annotated_ions", 1, 40.0)).await.unwrap();

        let filter = HistoryFilter {
            table_name: Some("main_lipids".to_string()),
            record_id: None,
            limit: 10,
        };
        let history = store.query_history(&filter).await.unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.backup_id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a3", "a1"]);

        let filter = HistoryFilter {
            table_name: Some("main_lipids".to_string()),
            record_id: Some(1),
            limit: 1,
        };
        let history = store.query_history(&filter).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].backup_id, "a2");
    }

    #[tokio::test]
    async fn retention_cutoff_is_strict() {
        let store = MemoryBackupStore::new();
        store.append_record(&record("old", "t", 1, 99.9)).await.unwrap();
        store.append_record(&record("edge", "t", 2, 100.0)).await.unwrap();
        store.append_record(&record("new", "t", 3, 100.1)).await.unwrap();

        let deleted = store.delete_records_before(100.0).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count_records().await.unwrap(), 2);

        // Idempotent: a second pass removes nothing
        assert_eq!(store.delete_records_before(100.0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn snapshots_never_touched_by_record_deletion() {
        let store = MemoryBackupStore::new();
        let snapshot = Snapshot {
            snapshot_id: "snapshot_1".to_string(),
            timestamp: 1.0,
            description: "d".to_string(),
            tables_count: 0,
            records_count: 0,
            compressed_size: 0,
            file_path: "snapshot_1.json.gz".to_string(),
            content_hash: String::new(),
        };
        store.insert_snapshot(&snapshot).await.unwrap();
        store.delete_records_before(f64::MAX).await.unwrap();
        assert_eq!(store.count_snapshots().await.unwrap(), 1);
    }
}
