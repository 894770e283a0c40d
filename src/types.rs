// Core data model - backup records, snapshots, stats, restore plans

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single row payload as captured from a business table
pub type RowData = HashMap<String, Value>;

/// Kind of mutation a backup record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Row creation; carries `new_data` only
    Insert,
    /// Row modification; carries both payloads when available
    Update,
    /// Row removal; carries `old_data` only
    Delete,
}

impl Operation {
    /// Wire/database form of the operation kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Operation::Insert),
            "UPDATE" => Ok(Operation::Update),
            "DELETE" => Ok(Operation::Delete),
            other => Err(format!("unknown operation kind: {}", other)),
        }
    }
}

/// Immutable capture of one row-level mutation's before/after state.
///
/// Records are append-only: once stored they are never updated or deleted
/// individually, only bulk-aged by retention cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Collision-resistant 16-hex-char identifier, unique across the store
    pub backup_id: String,
    /// Business table the mutation targets
    pub table_name: String,
    /// Identifier of the affected row
    pub record_id: i64,
    /// Mutation kind
    pub operation: Operation,
    /// Row state before the mutation (absent for inserts)
    pub old_data: Option<RowData>,
    /// Row state after the mutation (absent for deletes)
    pub new_data: Option<RowData>,
    /// Capture time, epoch seconds
    pub timestamp: f64,
    /// Actor that triggered the mutation, when known
    pub user_id: Option<String>,
    /// Originating surface tag, e.g. "web_app", "api", "admin"
    pub source: String,
    /// Truncated SHA-256 over the canonical form of the reference payload
    /// (`old_data` if present, else `new_data`)
    pub content_hash: String,
}

/// Metadata for one full-dataset export.
///
/// Immutable once created; the referenced artifact stays in the blob store
/// until pruned manually, never by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Human-traceable identifier, `snapshot_<epoch-seconds>`
    pub snapshot_id: String,
    /// Export start time, epoch seconds
    pub timestamp: f64,
    /// Operator-supplied or generated description
    pub description: String,
    /// Number of tables exported successfully
    pub tables_count: u32,
    /// Sum of row counts across successfully exported tables
    pub records_count: u64,
    /// Byte length of the compressed artifact
    pub compressed_size: u64,
    /// Blob store key of the compressed artifact
    pub file_path: String,
    /// Truncated SHA-256 over the canonical manifest block
    pub content_hash: String,
}

/// Per-table export failure recorded in a snapshot manifest.
///
/// A failing table never aborts the snapshot; the failure is data, not an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFailure {
    /// Table whose export failed
    pub table: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Manifest block embedded in every snapshot artifact and hashed into
/// [`Snapshot::content_hash`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotManifest {
    /// Snapshot this manifest belongs to
    pub snapshot_id: String,
    /// Export start time, epoch seconds
    pub timestamp: f64,
    /// Snapshot description
    pub description: String,
    /// Producer tag
    pub created_by: String,
    /// Export wall-clock time, RFC 3339
    pub exported_at: String,
    /// Tables that were exported successfully
    pub tables: Vec<String>,
    /// Tables whose export failed, with reasons
    pub failed_tables: Vec<TableFailure>,
}

/// Dry-run report of what a restore from a snapshot would touch.
///
/// Producing a plan never mutates business data. Applying a restore is
/// deliberately not implemented by this engine; callers needing true
/// restoration must build it as an explicit, separately-authorized two-phase
/// operation on top of this report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestorePlan {
    /// Snapshot the plan was computed from
    pub snapshot_id: String,
    /// Snapshot description
    pub description: String,
    /// Snapshot creation time, epoch seconds
    pub created_at: f64,
    /// Tables that would be restored, with their row counts
    pub tables: Vec<TableRestorePlan>,
    /// Requested tables absent from the artifact
    pub missing_tables: Vec<String>,
    /// Sum of row counts across planned tables
    pub total_records: u64,
}

/// Row count a restore would write into one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRestorePlan {
    /// Target table
    pub table: String,
    /// Rows the artifact holds for it
    pub records: u64,
}

/// Operational statistics aggregated across the backup and blob stores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStats {
    /// Backup records currently retained
    pub total_backups: u64,
    /// Snapshots ever recorded
    pub total_snapshots: u64,
    /// Backup records captured in the last 24 hours
    pub recent_backups_24h: u64,
    /// Bytes held by the blob store for snapshot artifacts
    pub storage_used_bytes: u64,
}

/// Result of an integrity spot-check on a stored snapshot
#[derive(Debug, Clone)]
pub struct SnapshotVerification {
    /// Overall verdict: hash and size both match the recorded metadata
    pub is_valid: bool,
    /// Recomputed manifest hash equals the recorded `content_hash`
    pub hash_match: bool,
    /// Artifact byte length equals the recorded `compressed_size`
    pub size_match: bool,
    /// Artifact byte length as observed in the blob store
    pub artifact_size: u64,
}
