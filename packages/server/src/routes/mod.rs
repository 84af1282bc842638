use axum::{
    Router,
    routing::{get, post},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    let body_limit = usize::try_from(config.storage.max_upload_bytes).unwrap_or(usize::MAX);

    Router::new()
        .merge(post_routes())
        .merge(role_routes())
        .merge(user_routes())
        .layer(handlers::write_body_limit(body_limit))
        .route("/user", get(handlers::auth::me))
        .route("/auth/login", post(handlers::auth::login))
}

/// Public storage disk, mounted at `/storage`.
pub fn storage_routes() -> Router<AppState> {
    Router::new().route(
        "/{namespace}/{filename}",
        get(handlers::storage::serve_file),
    )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/roles",
            get(handlers::role::list_roles).post(handlers::role::create_role),
        )
        .route(
            "/roles/{id}",
            get(handlers::role::get_role)
                .put(handlers::role::update_role)
                .patch(handlers::role::update_role)
                .delete(handlers::role::delete_role),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
}
