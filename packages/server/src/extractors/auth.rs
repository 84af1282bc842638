use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// The caller identified by a valid bearer token.
///
/// Taking this as a handler argument makes the route require login. A
/// missing header is [`AppError::TokenMissing`]; anything else that fails
/// to verify is [`AppError::TokenInvalid`].
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::TokenMissing)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::TokenInvalid),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = jwt::verify(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::TokenInvalid
        })?;

        Ok(Self {
            user_id: claims.uid,
            email: claims.sub,
        })
    }
}
