use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::FilesystemBlobStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use warta_server::config::{AppConfig, DEV_JWT_SECRET};
use warta_server::state::AppState;
use warta_server::utils::hash::Argon2Hashing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    if config.auth.jwt_secret == DEV_JWT_SECRET {
        warn!("Using the built-in development JWT secret; set WARTA__AUTH__JWT_SECRET");
    }

    let db = warta_server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let blob_store = FilesystemBlobStore::new(
        config.storage.root.clone(),
        config.storage.max_upload_bytes,
    )
    .await
    .context("Failed to initialize blob storage")?;
    info!(root = %config.storage.root.display(), "Blob storage ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        blob_store: Arc::new(blob_store),
        hasher: Arc::new(Argon2Hashing::default()),
    };

    let app = warta_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
