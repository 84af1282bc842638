use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::storage::Namespace;
use sea_orm::*;
use tracing::instrument;

use crate::entity::post;
use crate::error::{AppError, ErrorBody};
use crate::extractors::form::FormData;
use crate::extractors::path::PostId;
use crate::handlers::commit_or_rollback;
use crate::models::post::*;
use crate::models::shared::{ApiResponse, PAGE_SIZE, PageQuery, Paginated};
use crate::state::AppState;
use crate::utils::upload::{remove_image, remove_replaced, stage_image};
use crate::validation::{FieldErrors, validate};

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "List posts",
    description = "Returns posts newest first, 8 per page.",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of posts", body = ApiResponse<Paginated<PostResponse>>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<PostResponse>>>, AppError> {
    let page = query.page();
    let select = post::Entity::find();

    let total = select
        .clone()
        .paginate(&state.db, PAGE_SIZE)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .offset(Some(query.offset()))
        .limit(Some(PAGE_SIZE))
        .all(&state.db)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        "List Data Posts",
        Paginated::new(data, page, total, "/api/posts"),
    )))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "Posts",
    operation_id = "createPost",
    summary = "Create a post",
    description = "Accepts multipart, urlencoded or JSON bodies. The optional `image` is stored as `{title-slug}-{timestamp}.{ext}` under `posts/`.",
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostResponse>),
        (status = 422, description = "Validation failed", body = FieldErrors),
        (status = 500, description = "Upload or persistence failed (UPLOAD_FAILED, PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_post(
    State(state): State<AppState>,
    form: FormData,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), AppError> {
    validate(&form, POST_RULES).map_err(AppError::ValidationFailed)?;
    let input = PostInput::from_form(&form);
    let store = state.blob_store.as_ref();

    let staged = match form.file("image") {
        Some(file) => Some(stage_image(store, Namespace::Posts, file, &input.title).await?),
        None => None,
    };

    let now = Utc::now();
    let new_post = post::ActiveModel {
        title: Set(input.title),
        description: Set(input.description),
        image: Set(staged.as_ref().map(|s| s.filename().to_string())),
        status: Set(input.status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = async {
        let txn = state.db.begin().await?;
        let inserted = new_post.insert(&txn).await;
        commit_or_rollback(txn, inserted).await
    }
    .await;

    match result {
        Ok(model) => {
            tracing::info!(id = model.id, "Post created");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new("Post Added Successfully!", model.into())),
            ))
        }
        Err(e) => {
            if let Some(staged) = staged {
                staged.discard(store).await;
            }
            Err(AppError::persistence("Post creation failed", e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a post by ID",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = ApiResponse<PostResponse>),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let model = find_post(&state.db, id).await?;
    Ok(Json(ApiResponse::new("Post Detail!", model.into())))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "Posts",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Replaces the text fields. A new `image` replaces the stored one; the old file is removed only after the update commits. Also served on PATCH.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostResponse>),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Validation failed", body = FieldErrors),
        (status = 500, description = "Upload or persistence failed (UPLOAD_FAILED, PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn update_post(
    State(state): State<AppState>,
    PostId(id): PostId,
    form: FormData,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    validate(&form, POST_RULES).map_err(AppError::ValidationFailed)?;
    let existing = find_post(&state.db, id).await?;
    let input = PostInput::from_form(&form);
    let store = state.blob_store.as_ref();

    let staged = match form.file("image") {
        Some(file) => Some(stage_image(store, Namespace::Posts, file, &input.title).await?),
        None => None,
    };

    let previous = existing.image.clone();
    let mut active: post::ActiveModel = existing.into();
    active.title = Set(input.title);
    active.description = Set(input.description);
    active.status = Set(input.status);
    if let Some(staged) = &staged {
        active.image = Set(Some(staged.filename().to_string()));
    }
    active.updated_at = Set(Utc::now());

    let result = async {
        let txn = state.db.begin().await?;
        let updated = active.update(&txn).await;
        commit_or_rollback(txn, updated).await
    }
    .await;

    match result {
        Ok(model) => {
            if let (Some(_), Some(previous)) = (&staged, previous.as_deref()) {
                remove_replaced(store, Namespace::Posts, previous).await;
            }
            Ok(Json(ApiResponse::new("Post Updated Successfully!", model.into())))
        }
        Err(e) => {
            if let Some(staged) = staged {
                staged.discard(store).await;
            }
            Err(AppError::persistence("Post update failed", e))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "Posts",
    operation_id = "deletePost",
    summary = "Delete a post",
    description = "Removes the stored image, then the row. Returns the deleted post.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = ApiResponse<PostResponse>),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Persistence failed (PERSISTENCE_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    const CONTEXT: &str = "Error deleting post";
    let model = find_post(&state.db, id).await?;

    if let Some(image) = model.image.as_deref() {
        remove_image(state.blob_store.as_ref(), Namespace::Posts, image, CONTEXT).await?;
    }

    let result = async {
        let txn = state.db.begin().await?;
        let deleted = post::Entity::delete_by_id(id).exec(&txn).await;
        commit_or_rollback(txn, deleted).await
    }
    .await;
    result.map_err(|e| AppError::persistence(CONTEXT, e))?;

    tracing::info!(id, "Post deleted");
    Ok(Json(ApiResponse::new("Post Deleted Successfully!", model.into())))
}

async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(PostId::NOT_FOUND.into()))
}
