use std::str::FromStr;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use common::storage::{BlobKey, Namespace};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Serve an uploaded image from the public storage disk.
#[utoipa::path(
    get,
    path = "/storage/{namespace}/{filename}",
    tag = "Storage",
    operation_id = "getStoredFile",
    summary = "Download a stored image",
    params(
        ("namespace" = String, Path, description = "`posts` or `users`"),
        ("filename" = String, Path, description = "Stored filename as returned in `image`"),
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_file(
    State(state): State<AppState>,
    Path((namespace, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let namespace =
        Namespace::from_str(&namespace).map_err(|_| AppError::NotFound("File not found".into()))?;
    let key = BlobKey::new(namespace, filename.as_str())?;
    let content = state.blob_store.get(&key).await?;

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        // Stored SVGs must not run scripts in our origin.
        .header(header::CONTENT_SECURITY_POLICY, "default-src 'none'; style-src 'unsafe-inline'; sandbox")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(content))
        .map_err(|e| AppError::Unexpected(e.to_string()))
}
