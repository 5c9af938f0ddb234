//! Blob storage for receipt images.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};

/// Flat key/bytes storage addressed by `/`-separated relative paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` at `path`, replacing any existing blob.
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Read the blob at `path`.
    async fn get(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Remove the blob at `path`. Fails with [`StoreError::NotFound`] if absent.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Paths of the blobs directly under `prefix`, sorted. Nested
    /// directories are not descended into.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    async fn exists(&self, path: &str) -> StoreResult<bool>;
}

/// [`BlobStore`] over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a blob path onto the filesystem. Only plain relative segments are
    /// accepted, so a path can never leave the root.
    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let invalid = || StoreError::InvalidPath(path.to_string());
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty()
            || trimmed.contains('\\')
            || trimmed
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid());
        }
        let relative = Path::new(trimmed);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(invalid());
        }
        Ok(self.root.join(relative))
    }

    fn not_found(path: &str) -> StoreError {
        StoreError::NotFound {
            collection: "blobs".to_string(),
            id: path.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, data).await?;
        tracing::debug!("Stored {path} ({} bytes)", data.len());
        Ok(())
    }

    async fn get(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::debug!("Deleted {path}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let dir = self.resolve(prefix)?;
        let prefix = prefix.trim_end_matches('/');

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                paths.push(format!("{prefix}/{name}"));
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store.put("receipts/u1/a.jpg", b"abc").await.unwrap();
        assert!(store.exists("receipts/u1/a.jpg").await.unwrap());
        assert_eq!(store.get("receipts/u1/a.jpg").await.unwrap(), b"abc");
        assert!(dir.path().join("receipts/u1/a.jpg").is_file());

        store.delete("receipts/u1/a.jpg").await.unwrap();
        assert!(!store.exists("receipts/u1/a.jpg").await.unwrap());
        assert!(matches!(
            store.delete("receipts/u1/a.jpg").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.get("receipts/u1/a.jpg").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_shallow() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.put("receipts/u1/b.jpg", b"b").await.unwrap();
        store.put("receipts/u1/a.jpg", b"a").await.unwrap();
        store.put("receipts/u1/nested/c.jpg", b"c").await.unwrap();
        store.put("receipts/u2/d.jpg", b"d").await.unwrap();

        assert_eq!(
            store.list("receipts/u1").await.unwrap(),
            vec!["receipts/u1/a.jpg", "receipts/u1/b.jpg"]
        );
        assert_eq!(
            store.list("receipts/u1/").await.unwrap(),
            vec!["receipts/u1/a.jpg", "receipts/u1/b.jpg"]
        );
        assert!(store.list("receipts/nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("root"));
        for path in ["", "/etc/passwd", "../x.jpg", "a/../../x.jpg", "a/./b", "a//b", "a\\b"] {
            assert!(
                matches!(store.put(path, b"x").await, Err(StoreError::InvalidPath(_))),
                "accepted {path:?}"
            );
        }
    }
}
