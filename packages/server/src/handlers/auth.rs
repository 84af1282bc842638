use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::FormData;
use crate::models::auth::{LOGIN_RULES, LoginForm, LoginResponse};
use crate::models::shared::ApiResponse;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::{hash::verify_blocking, jwt};
use crate::validation::{FieldErrors, validate};

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in",
    request_body(content = LoginForm, content_type = "application/json"),
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 422, description = "Validation failed", body = FieldErrors),
    ),
)]
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    validate(&form, LOGIN_RULES).map_err(AppError::ValidationFailed)?;
    let email = form.text("email").unwrap_or_default();
    let password = form.text("password").unwrap_or_default();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = verify_blocking(state.hasher.clone(), password, user.password.clone())
        .await
        .map_err(|e| AppError::Unexpected(format!("Password verify error: {e}")))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.email,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Unexpected(format!("JWT sign error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(ApiResponse::new(
        "Login successful",
        LoginResponse {
            token,
            token_type: "Bearer",
            user: user.into(),
        },
    )))
}

/// Return the authenticated caller's user record.
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Auth",
    operation_id = "currentUser",
    summary = "Get the authenticated user",
    responses(
        (status = 200, description = "The caller's user record", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    // A token can outlive the account it was issued for.
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(Json(user.into()))
}
