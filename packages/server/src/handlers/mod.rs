pub mod auth;
pub mod post;
pub mod role;
pub mod storage;
pub mod user;

use axum::extract::DefaultBodyLimit;
use sea_orm::{DatabaseTransaction, DbErr};

/// Body limit for write routes: room for a 2 MB image plus form fields.
pub fn write_body_limit(max_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_bytes)
}

/// Commit when the write succeeded, otherwise roll back and return the
/// original error.
pub(crate) async fn commit_or_rollback<T>(
    txn: DatabaseTransaction,
    result: Result<T, DbErr>,
) -> Result<T, DbErr> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

