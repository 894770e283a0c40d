// Snapshot engine - full-dataset export with compression, manifest hashing,
// and integrity verification.

use std::collections::HashMap;
use std::io::{Read, Write};

use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::BackupEngine;
use crate::hash;
use crate::types::{RowData, Snapshot, SnapshotManifest, SnapshotVerification, TableFailure};
use crate::{Result, VaultError};

/// Version tag written into every artifact; readers reject anything else
pub const ENVELOPE_FORMAT_VERSION: u32 = 1;

/// The self-describing document persisted as a snapshot artifact
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotEnvelope {
    pub format_version: u32,
    pub manifest: SnapshotManifest,
    pub tables: HashMap<String, Vec<RowData>>,
}

pub(crate) fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| VaultError::Compression(format!("failed to compress artifact: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| VaultError::Compression(format!("failed to finalize compression: {}", e)))
}

pub(crate) fn decode_envelope(artifact: &[u8]) -> Result<SnapshotEnvelope> {
    let mut decoder = GzDecoder::new(artifact);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| VaultError::InvalidSnapshot(format!("decompression failed: {}", e)))?;

    let envelope: SnapshotEnvelope = serde_json::from_slice(&raw)
        .map_err(|e| VaultError::InvalidSnapshot(format!("envelope parse failed: {}", e)))?;

    if envelope.format_version != ENVELOPE_FORMAT_VERSION {
        return Err(VaultError::InvalidSnapshot(format!(
            "unsupported format version {}",
            envelope.format_version
        )));
    }

    Ok(envelope)
}

impl BackupEngine {
    /// Export all tracked tables into one compressed, hashed artifact and
    /// record its metadata. Returns the new snapshot id.
    ///
    /// A table whose export fails is recorded in the manifest's
    /// `failed_tables` and skipped; the snapshot itself still succeeds.
    /// Rows from different tables may reflect slightly different instants:
    /// the export takes no cross-table transaction, so the snapshot is
    /// best-effort consistent, not point-in-time.
    pub async fn create_snapshot(&self, description: Option<&str>) -> Result<String> {
        let timestamp = Self::now_epoch();
        let snapshot_id = format!("{}_{}", self.config().snapshot_prefix, timestamp as u64);
        let description = description.map(str::to_string).unwrap_or_else(|| {
            format!("Auto snapshot {}", Utc::now().format("%Y-%m-%d %H:%M:%S"))
        });

        info!(snapshot_id = %snapshot_id, "starting snapshot export");

        let mut tables: HashMap<String, Vec<RowData>> = HashMap::new();
        let mut exported: Vec<String> = Vec::new();
        let mut failed: Vec<TableFailure> = Vec::new();
        let mut records_count = 0u64;

        for table in &self.config().tracked_tables {
            match self.provider().fetch_table(table).await {
                Ok(rows) => {
                    info!(table = %table, rows = rows.len(), "exported table");
                    records_count += rows.len() as u64;
                    exported.push(table.clone());
                    tables.insert(table.clone(), rows);
                }
                Err(e) => {
                    warn!(table = %table, error = %e, "table export failed, continuing");
                    failed.push(TableFailure {
                        table: table.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let manifest = SnapshotManifest {
            snapshot_id: snapshot_id.clone(),
            timestamp,
            description: description.clone(),
            created_by: "rowvault".to_string(),
            exported_at: Utc::now().to_rfc3339(),
            tables: exported.clone(),
            failed_tables: failed,
        };

        // Hash covers the manifest block only, not the table payloads
        let content_hash = hash::hash_canonical(&serde_json::to_value(&manifest)?)?;

        let envelope = SnapshotEnvelope {
            format_version: ENVELOPE_FORMAT_VERSION,
            manifest,
            tables,
        };

        let raw = serde_json::to_vec(&envelope)?;
        let compressed = compress(&raw, self.config().compression_level)?;
        let compressed_size = compressed.len() as u64;

        let file_path = format!("{}.json.gz", snapshot_id);
        self.blobs().put(&file_path, &compressed).await?;

        let snapshot = Snapshot {
            snapshot_id: snapshot_id.clone(),
            timestamp,
            description,
            tables_count: exported.len() as u32,
            records_count,
            compressed_size,
            file_path,
            content_hash,
        };
        self.store().insert_snapshot(&snapshot).await?;

        info!(
            snapshot_id = %snapshot_id,
            tables = snapshot.tables_count,
            records = records_count,
            compressed_size,
            "snapshot created"
        );

        Ok(snapshot_id)
    }

    /// Spot-check a stored snapshot: recompute the manifest hash from the
    /// artifact and compare hash and byte length against the recorded
    /// metadata.
    pub async fn verify_snapshot(&self, snapshot_id: &str) -> Result<SnapshotVerification> {
        let snapshot = self
            .store()
            .get_snapshot(snapshot_id)
            .await?
            .ok_or_else(|| VaultError::SnapshotNotFound(snapshot_id.to_string()))?;

        let artifact = self.blobs().get(&snapshot.file_path).await?;
        let envelope = decode_envelope(&artifact)?;

        let recomputed = hash::hash_canonical(&serde_json::to_value(&envelope.manifest)?)?;
        let hash_match = recomputed == snapshot.content_hash;
        let artifact_size = artifact.len() as u64;
        let size_match = artifact_size == snapshot.compressed_size;

        if !hash_match || !size_match {
            warn!(
                snapshot_id = %snapshot_id,
                hash_match,
                size_match,
                "snapshot verification mismatch"
            );
        }

        Ok(SnapshotVerification {
            is_valid: hash_match && size_match,
            hash_match,
            size_match,
            artifact_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_format_version_is_rejected() {
        let envelope = serde_json::json!({
            "format_version": 2,
            "manifest": {
                "snapshot_id": "snapshot_1",
                "timestamp": 1.0,
                "description": "d",
                "created_by": "rowvault",
                "exported_at": "2026-01-01T00:00:00Z",
                "tables": [],
                "failed_tables": []
            },
            "tables": {}
        });
        let compressed =
            compress(&serde_json::to_vec(&envelope).unwrap(), 6).unwrap();

        let err = decode_envelope(&compressed).unwrap_err();
        assert!(matches!(err, VaultError::InvalidSnapshot(msg) if msg.contains("version")));
    }

    #[test]
    fn garbage_bytes_are_invalid_not_io() {
        let err = decode_envelope(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, VaultError::InvalidSnapshot(_)));
    }
}
