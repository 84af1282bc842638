use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// Parse the `{id}` path segment. Ids that do not parse can never match a
/// row, so they get the same `NOT_FOUND` as a missing row.
async fn id_from_path<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
    not_found: &'static str,
) -> Result<i32, AppError> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::NotFound(not_found.into()))
}

macro_rules! resource_id {
    ($(#[$doc:meta])* $name:ident => $not_found:literal) => {
        $(#[$doc])*
        pub struct $name(pub i32);

        impl $name {
            pub const NOT_FOUND: &'static str = $not_found;
        }

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                id_from_path(parts, state, Self::NOT_FOUND).await.map(Self)
            }
        }
    };
}

resource_id!(
    /// Post id from `/api/posts/{id}`.
    PostId => "Post not found"
);
resource_id!(
    /// Role id from `/api/roles/{id}`.
    RoleId => "Role not found"
);
resource_id!(
    /// User id from `/api/users/{id}`.
    UserId => "User not found"
);
