use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::role;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::FormData;
use crate::extractors::path::RoleId;
use crate::handlers::commit_or_rollback;
use crate::models::role::*;
use crate::models::shared::{ApiResponse, MessageResponse, PAGE_SIZE, PageQuery, Paginated};
use crate::state::AppState;
use crate::validation::{FieldErrors, validate};

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    operation_id = "listRoles",
    summary = "List roles",
    description = "Returns roles newest first, 8 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of roles", body = ApiResponse<Paginated<RoleResponse>>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<RoleResponse>>>, AppError> {
    let page = query.page();
    let select = role::Entity::find();

    let total = select
        .clone()
        .paginate(&state.db, PAGE_SIZE)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(role::Column::CreatedAt)
        .order_by_desc(role::Column::Id)
        .offset(Some(query.offset()))
        .limit(Some(PAGE_SIZE))
        .all(&state.db)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        "List Data Roles",
        Paginated::new(data, page, total, "/api/roles"),
    )))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    operation_id = "createRole",
    summary = "Create a role",
    request_body(content = RoleForm, content_type = "application/json"),
    responses(
        (status = 201, description = "Role created", body = ApiResponse<RoleResponse>),
        (status = 422, description = "Validation failed", body = FieldErrors),
        (status = 500, description = "Persistence failed (PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_role(
    State(state): State<AppState>,
    form: FormData,
) -> Result<(StatusCode, Json<ApiResponse<RoleResponse>>), AppError> {
    validate(&form, ROLE_RULES).map_err(AppError::ValidationFailed)?;
    let input = RoleInput::from_form(&form);

    let now = Utc::now();
    let new_role = role::ActiveModel {
        name: Set(input.name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = async {
        let txn = state.db.begin().await?;
        let inserted = new_role.insert(&txn).await;
        commit_or_rollback(txn, inserted).await
    }
    .await
    .map_err(|e| AppError::persistence("Role creation failed", e))?;

    tracing::info!(id = model.id, "Role created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Role created successfully", model.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Roles",
    operation_id = "getRole",
    summary = "Get a role by ID",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role details", body = ApiResponse<RoleResponse>),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    RoleId(id): RoleId,
) -> Result<Json<ApiResponse<RoleResponse>>, AppError> {
    let model = find_role(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Role Detail!", model.into())))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "Roles",
    operation_id = "updateRole",
    summary = "Update a role",
    description = "Also served on PATCH.",
    params(("id" = i32, Path, description = "Role ID")),
    request_body(content = RoleForm, content_type = "application/json"),
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<RoleResponse>),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation failed", body = FieldErrors),
        (status = 500, description = "Persistence failed (PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn update_role(
    State(state): State<AppState>,
    RoleId(id): RoleId,
    form: FormData,
) -> Result<Json<ApiResponse<RoleResponse>>, AppError> {
    validate(&form, ROLE_RULES).map_err(AppError::ValidationFailed)?;
    let existing = find_role(&state.db, id).await?;
    let input = RoleInput::from_form(&form);

    let mut active: role::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.updated_at = Set(Utc::now());

    let model = async {
        let txn = state.db.begin().await?;
        let updated = active.update(&txn).await;
        commit_or_rollback(txn, updated).await
    }
    .await
    .map_err(|e| AppError::persistence("Role update failed", e))?;

    Ok(Json(ApiResponse::new("Role updated successfully", model.into())))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    operation_id = "deleteRole",
    summary = "Delete a role",
    description = "Returns `data: null`.",
    params(("id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = MessageResponse),
        (status = 404, description = "Role not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Persistence failed (PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_role(
    State(state): State<AppState>,
    RoleId(id): RoleId,
) -> Result<Json<MessageResponse>, AppError> {
    find_role(&state.db, id).await?;

    async {
        let txn = state.db.begin().await?;
        let deleted = role::Entity::delete_by_id(id).exec(&txn).await;
        commit_or_rollback(txn, deleted).await
    }
    .await
    .map_err(|e| AppError::persistence("Error deleting role", e))?;

    tracing::info!(id, "Role deleted");
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}

async fn find_role<C: ConnectionTrait>(db: &C, id: i32) -> Result<role::Model, AppError> {
    role::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(RoleId::NOT_FOUND.into()))
}
