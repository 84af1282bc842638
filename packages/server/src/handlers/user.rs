use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::storage::Namespace;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::FormData;
use crate::extractors::path::UserId;
use crate::handlers::commit_or_rollback;
use crate::models::shared::{ApiResponse, PAGE_SIZE, PageQuery, Paginated};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::hash::hash_blocking;
use crate::utils::upload::{remove_image, remove_replaced, stage_image};
use crate::validation::{FieldErrors, FieldRules, validate};

const EMAIL_TAKEN: &str = "The email has already been taken.";

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Returns users newest first, 8 per page. Password hashes are never included.",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = ApiResponse<Paginated<UserResponse>>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let page = query.page();
    let select = user::Entity::find();

    let total = select
        .clone()
        .paginate(&state.db, PAGE_SIZE)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .offset(Some(query.offset()))
        .limit(Some(PAGE_SIZE))
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        "User Lists",
        Paginated::new(data, page, total, "/api/users"),
    )))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    description = "The password is stored as an Argon2 hash. The optional `image` is stored as `{username-slug}-{timestamp}.{ext}` under `users/`.",
    request_body(content = UserForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 422, description = "Validation failed, including a taken email", body = FieldErrors),
        (status = 500, description = "Upload or persistence failed (UPLOAD_FAILED, PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_user(
    State(state): State<AppState>,
    form: FormData,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    const CONTEXT: &str = "User creation failed";
    validate_user(&state.db, &form, USER_CREATE_RULES, None).await?;
    let input = UserInput::from_form(&form);
    let store = state.blob_store.as_ref();

    let staged = match form.file("image") {
        Some(file) => Some(stage_image(store, Namespace::Users, file, &input.username).await?),
        None => None,
    };

    let result = async {
        let password = input.password.unwrap_or_default();
        let hash = hash_blocking(state.hasher.clone(), password)
            .await
            .map_err(|e| AppError::Unexpected(format!("Password hash error: {e}")))?;

        let now = Utc::now();
        let new_user = user::ActiveModel {
            nomor_induk: Set(input.nomor_induk),
            fullname: Set(input.fullname),
            username: Set(input.username),
            email: Set(input.email),
            password: Set(hash),
            image: Set(staged.as_ref().map(|s| s.filename().to_string())),
            phone: Set(input.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let written = async {
            let txn = state.db.begin().await?;
            let inserted = new_user.insert(&txn).await;
            commit_or_rollback(txn, inserted).await
        }
        .await;
        written.map_err(|e| write_error(CONTEXT, e))
    }
    .await;

    match result {
        Ok(model) => {
            tracing::info!(id = model.id, "User created");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new("User Added Successfully", model.into())),
            ))
        }
        Err(e) => {
            if let Some(staged) = staged {
                staged.discard(store).await;
            }
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user by ID",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let model = find_user(&state.db, id).await?;
    Ok(Json(ApiResponse::new("User Detail", model.into())))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user",
    description = "Omit `password` to keep the current one. Email uniqueness ignores this user. Omitting `phone` keeps the stored value. Also served on PATCH.",
    params(("id" = i32, Path, description = "User ID")),
    request_body(content = UserForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation failed, including a taken email", body = FieldErrors),
        (status = 500, description = "Upload or persistence failed (UPLOAD_FAILED, PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    form: FormData,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    const CONTEXT: &str = "User update failed";
    validate_user(&state.db, &form, USER_UPDATE_RULES, Some(id)).await?;
    let existing = find_user(&state.db, id).await?;
    let input = UserInput::from_form(&form);
    let store = state.blob_store.as_ref();

    let staged = match form.file("image") {
        Some(file) => Some(stage_image(store, Namespace::Users, file, &input.username).await?),
        None => None,
    };
    let previous = existing.image.clone();

    let result = async {
        let mut active: user::ActiveModel = existing.into();
        active.nomor_induk = Set(input.nomor_induk);
        active.fullname = Set(input.fullname);
        active.username = Set(input.username);
        active.email = Set(input.email);
        if let Some(password) = input.password {
            let hash = hash_blocking(state.hasher.clone(), password)
                .await
                .map_err(|e| AppError::Unexpected(format!("Password hash error: {e}")))?;
            active.password = Set(hash);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(staged) = &staged {
            active.image = Set(Some(staged.filename().to_string()));
        }
        active.updated_at = Set(Utc::now());

        let written = async {
            let txn = state.db.begin().await?;
            let updated = active.update(&txn).await;
            commit_or_rollback(txn, updated).await
        }
        .await;
        written.map_err(|e| write_error(CONTEXT, e))
    }
    .await;

    match result {
        Ok(model) => {
            if let (Some(_), Some(previous)) = (&staged, previous.as_deref()) {
                remove_replaced(store, Namespace::Users, previous).await;
            }
            Ok(Json(ApiResponse::new("User Updated Successfully", model.into())))
        }
        Err(e) => {
            if let Some(staged) = staged {
                staged.discard(store).await;
            }
            Err(e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Removes the stored image, then the row. Returns the deleted user.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Persistence failed (PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    const CONTEXT: &str = "Error deleting user";
    let model = find_user(&state.db, id).await?;

    if let Some(image) = model.image.as_deref() {
        remove_image(state.blob_store.as_ref(), Namespace::Users, image, CONTEXT).await?;
    }

    async {
        let txn = state.db.begin().await?;
        let deleted = user::Entity::delete_by_id(id).exec(&txn).await;
        commit_or_rollback(txn, deleted).await
    }
    .await
    .map_err(|e| AppError::persistence(CONTEXT, e))?;

    tracing::info!(id, "User deleted");
    Ok(Json(ApiResponse::new("User Deleted Successfully", model.into())))
}

/// Field rules plus the email uniqueness check, which needs the database.
async fn validate_user(
    db: &DatabaseConnection,
    form: &FormData,
    rules: &[FieldRules],
    except_id: Option<i32>,
) -> Result<(), AppError> {
    let mut errors = validate(form, rules).err().unwrap_or_default();

    if errors.get("email").is_none()
        && let Some(email) = form.text("email")
    {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
        if let Some(id) = except_id {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.count(db).await? > 0 {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    if !errors.is_empty() {
        tracing::warn!(fields = ?errors.fields(), "User validation failed");
    }
    errors.into_result().map_err(AppError::ValidationFailed)
}

/// A unique violation at write time means another request claimed the email
/// after validation ran.
fn write_error(context: &'static str, e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Email uniqueness race caught on write");
            let mut errors = FieldErrors::default();
            errors.add("email", EMAIL_TAKEN);
            AppError::ValidationFailed(errors)
        }
        _ => AppError::persistence(context, e),
    }
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(UserId::NOT_FOUND.into()))
}
