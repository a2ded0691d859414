use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use common::storage::filesystem::FilesystemBlobStore;
use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;

    let blob_store = FilesystemBlobStore::new(
        config.storage.root.clone(),
        config.storage.max_blob_size,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize blob store: {e}"))?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        config,
    };
    let app = server::build_router(state);

    info!("Server running at http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
