use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{BlobError, BlobStore};

/// Filesystem blob store: one file per artifact inside a flat directory.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn ensure_root_exists(&self) -> Result<(), BlobError> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)
                .await
                .map_err(|e| BlobError::Io(format!("failed to create blob directory: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        self.ensure_root_exists().await?;

        let path = self.blob_path(key);
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| BlobError::Io(format!("failed to create {}: {}", path.display(), e)))?;
        file.write_all(data)
            .await
            .map_err(|e| BlobError::Io(format!("failed to write {}: {}", path.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| BlobError::Io(format!("failed to sync {}: {}", path.display(), e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.blob_path(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => Err(BlobError::Io(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.blob_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => Err(BlobError::Io(format!(
                "failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn total_size(&self) -> Result<u64, BlobError> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| BlobError::Io(format!("failed to read blob directory: {}", e)))?;

        let mut total = 0u64;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BlobError::Io(format!("failed to read directory entry: {}", e)))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| BlobError::Io(format!("failed to stat blob: {}", e)))?;
            if meta.is_file() {
                total += meta.len();
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_get_roundtrip_and_size() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().join("blobs"));

        store.put("snapshot_1.json.gz", b"payload-one").await.unwrap();
        store.put("snapshot_2.json.gz", b"p2").await.unwrap();

        assert_eq!(store.get("snapshot_1.json.gz").await.unwrap(), b"payload-one");
        assert_eq!(store.total_size().await.unwrap(), 11 + 2);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path());

        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(k) if k == "nope"));
    }

    #[tokio::test]
    async fn size_is_zero_before_first_write() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().join("never-created"));
        assert_eq!(store.total_size().await.unwrap(), 0);
    }
}
