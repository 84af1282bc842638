use common::storage::{BlobKey, BlobStore, Namespace, StorageError};

use crate::error::AppError;
use crate::extractors::form::UploadedFile;
use crate::utils::filename::image_filename;
use crate::validation::ImageKind;

const MAX_NAME_ATTEMPTS: u32 = 100;

/// An image written to the blob store whose owning row is not committed yet.
///
/// Call [`StagedImage::discard`] if the row write fails so no blob is left
/// without a row pointing at it.
#[derive(Debug)]
pub struct StagedImage {
    key: BlobKey,
}

impl StagedImage {
    /// Generated filename as stored on the row.
    pub fn filename(&self) -> &str {
        self.key.filename()
    }

    /// Remove the staged blob after a failed row write.
    pub async fn discard(self, store: &dyn BlobStore) {
        if let Err(e) = store.delete(&self.key).await {
            tracing::warn!(key = %self.key, "Failed to remove orphaned upload: {}", e);
        }
    }
}

/// Write an uploaded image as `{slug}-{timestamp}.{ext}` under `namespace`,
/// where the slug is derived from `source_name`. A name that is already
/// stored gets a `-{n}` suffix; the store's create-only `put` decides which
/// names are free, so concurrent uploads never share a file.
pub async fn stage_image(
    store: &dyn BlobStore,
    namespace: Namespace,
    file: &UploadedFile,
    source_name: &str,
) -> Result<StagedImage, AppError> {
    let client_ext = file.client_extension();
    let extension = match ImageKind::sniff(&file.bytes) {
        Some(kind) => kind.storage_extension(client_ext.as_deref()),
        None => client_ext.unwrap_or_else(|| "bin".to_string()),
    };

    let timestamp = chrono::Utc::now().timestamp();
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = image_filename(source_name, timestamp, attempt, &extension);
        let key = BlobKey::new(namespace, filename)
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;

        match store.put(&key, &file.bytes).await {
            Ok(()) => {
                tracing::info!(key = %key, bytes = file.bytes.len(), "Stored uploaded image");
                return Ok(StagedImage { key });
            }
            // Another upload holds this name; try the next suffix.
            Err(StorageError::AlreadyExists(_)) => continue,
            Err(e) => return Err(AppError::UploadFailed(e.to_string())),
        }
    }

    Err(AppError::UploadFailed(format!(
        "no free filename for '{source_name}' at {timestamp}"
    )))
}

/// Delete a replaced image once the new row state is committed. Failures
/// are logged; the request has already succeeded.
pub async fn remove_replaced(store: &dyn BlobStore, namespace: Namespace, previous: &str) {
    let key = match BlobKey::new(namespace, previous) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(filename = previous, "Skipping cleanup of invalid image name: {}", e);
            return;
        }
    };
    match store.delete(&key).await {
        Ok(_) => tracing::debug!(key = %key, "Removed replaced image"),
        Err(e) => tracing::warn!(key = %key, "Failed to remove replaced image: {}", e),
    }
}

/// Delete a row's image ahead of deleting the row. A file that is already
/// gone is not an error.
pub async fn remove_image(
    store: &dyn BlobStore,
    namespace: Namespace,
    filename: &str,
    context: &'static str,
) -> Result<(), AppError> {
    let Ok(key) = BlobKey::new(namespace, filename) else {
        tracing::warn!(filename, "Row references an invalid image name; skipping blob delete");
        return Ok(());
    };
    store
        .delete(&key)
        .await
        .map_err(|e| AppError::persistence(context, e))?;
    Ok(())
}
