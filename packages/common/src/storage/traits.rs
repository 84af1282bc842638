use async_trait::async_trait;

use super::error::StorageError;
use super::key::BlobKey;

/// Where uploaded images live. Keys are namespaced and flat.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under a key that is not taken yet. A taken key fails
    /// with [`StorageError::AlreadyExists`] and leaves the stored blob as is,
    /// even when two writers race for the same key.
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<(), StorageError>;

    /// Whole content of `key`, or [`StorageError::NotFound`].
    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError>;

    /// Remove `key`. `Ok(false)` means there was nothing to remove.
    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError>;
}
