//! Backup identifier allocation.
//!
//! Ids combine a high-resolution timestamp, the calling thread's identifier,
//! and a random UUID, hashed and truncated to 16 hex chars. Entropy makes
//! accidental collision rare; the store's uniqueness constraint plus the
//! engine's bounded retry make it safe.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Number of hex chars kept from the digest
pub const BACKUP_ID_LEN: usize = 16;

/// Allocate a new high-entropy backup identifier.
///
/// No lock is taken; concurrent callers get independent ids. Uniqueness is
/// enforced at insertion time by the backup store.
pub fn new_backup_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let thread_id = format!("{:?}", std::thread::current().id());
    let nonce = Uuid::new_v4();

    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}_{}", nanos, thread_id, nonce));
    let digest = format!("{:x}", hasher.finalize());
    digest[..BACKUP_ID_LEN].to_string()
}
