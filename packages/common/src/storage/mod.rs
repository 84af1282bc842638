//! Namespaced storage for uploaded files.

mod error;
mod filesystem;
mod key;
mod traits;

pub use error::StorageError;
pub use filesystem::FilesystemBlobStore;
pub use key::{BlobKey, MAX_FILENAME_LEN, Namespace};
pub use traits::BlobStore;
