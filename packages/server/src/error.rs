use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::validation::FieldErrors;

/// Structured error response returned by all endpoints on failure, except
/// validation failures which return the bare [`FieldErrors`] map.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,
    /// Machine-readable error code. One of: `BAD_REQUEST`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `NOT_FOUND`, `UPLOAD_FAILED`,
    /// `PERSISTENCE_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Post not found")]
    pub message: String,
    /// Underlying cause, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "database is locked")]
    pub detail: Option<String>,
    /// Always `null`.
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// One or more fields failed validation. Nothing was written.
    ValidationFailed(FieldErrors),
    /// The request body could not be decoded at all.
    BadRequest(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    /// Writing an uploaded file to the blob store failed.
    UploadFailed(String),
    /// A database write failed and was rolled back. `context` names the
    /// operation, `cause` carries the driver message.
    PersistenceFailed {
        context: &'static str,
        cause: String,
    },
    Unexpected(String),
}

impl AppError {
    pub fn persistence(context: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::PersistenceFailed {
            context,
            cause: err.to_string(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message, detail) = match self {
            // Rendered as a bare field map by `into_response`.
            AppError::ValidationFailed(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "The given data was invalid".to_string(),
                None,
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication required".into(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
                None,
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".into(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::UploadFailed(cause) => {
                tracing::error!("File upload failed: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPLOAD_FAILED",
                    "File upload failed".into(),
                    Some(cause),
                )
            }
            AppError::PersistenceFailed { context, cause } => {
                tracing::error!("{}: {}", context, cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILED",
                    context.to_string(),
                    Some(cause),
                )
            }
            AppError::Unexpected(cause) => {
                tracing::error!("Internal error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An error occurred".into(),
                    Some(cause),
                )
            }
        };

        (
            status,
            ErrorBody {
                success: false,
                code,
                message,
                detail,
                data: None,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::ValidationFailed(errors) = self {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response();
        }

        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Unexpected(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("File '{path}' not found")),
            StorageError::InvalidKey(_) => AppError::NotFound("File not found".into()),
            other => AppError::Unexpected(other.to_string()),
        }
    }
}
