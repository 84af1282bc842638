use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::{BlobKey, Namespace};
use super::traits::BlobStore;

const STAGING_DIR: &str = ".tmp";

/// Blob store rooted at a local directory laid out like a public disk:
/// `{root}/posts/...` and `{root}/users/...`, plus a hidden staging area.
///
/// The root can be served as-is, since nothing but finished uploads ever
/// appears under the namespace directories. Staging and namespace
/// directories must share a filesystem.
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Open (and if necessary create) a store at `root`. Writes larger than
    /// `max_size` bytes are refused.
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        ensure_layout(&root).await?;
        Ok(Self { root, max_size })
    }

    /// On-disk location of `key`.
    pub fn blob_path(&self, key: &BlobKey) -> PathBuf {
        let mut path = self.root.join(key.namespace().as_str());
        path.push(key.filename());
        path
    }

    fn staging_file(&self) -> PathBuf {
        self.root
            .join(STAGING_DIR)
            .join(format!("{}.part", uuid::Uuid::new_v4()))
    }

    fn check_size(&self, len: usize) -> Result<(), StorageError> {
        let actual = len as u64;
        if actual > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual,
                limit: self.max_size,
            });
        }
        Ok(())
    }
}

async fn ensure_layout(root: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(root.join(STAGING_DIR)).await?;
    for namespace in Namespace::ALL {
        fs::create_dir_all(root.join(namespace.as_str())).await?;
    }
    Ok(())
}

/// Write `data` to `staging`, then link it in as `target`. Linking fails
/// with `AlreadyExists` instead of replacing a file, so concurrent writers
/// of one name cannot clobber each other. The staging file is always removed.
async fn publish(staging: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let outcome = async {
        fs::write(staging, data).await?;
        fs::hard_link(staging, target).await
    }
    .await;

    if let Err(e) = fs::remove_file(staging).await
        && e.kind() != ErrorKind::NotFound
    {
        tracing::warn!(path = %staging.display(), error = %e, "Could not clean up staging file");
    }
    outcome
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError> {
        self.check_size(data.len())?;
        let target = self.blob_path(key);
        publish(&self.staging_file(), &target, data)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(key.path()),
                _ => e.into(),
            })?;
        tracing::debug!(key = %key, bytes = data.len(), "Blob written");
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        fs::read(self.blob_path(key)).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.path()),
            _ => e.into(),
        })
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Blob removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
