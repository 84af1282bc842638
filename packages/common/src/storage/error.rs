use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing is stored under the given `{namespace}/{filename}` path.
    #[error("no blob at '{0}'")]
    NotFound(String),
    /// `put` never replaces an existing blob.
    #[error("a blob already exists at '{0}'")]
    AlreadyExists(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("upload of {actual} bytes is over the {limit} byte limit")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
