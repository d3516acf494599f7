//! Uplink API Server
//!
//! Main entry point for the upload service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uplink_api::{AppState, create_router};
use uplink_core::storage::LocalDiskStore;
use uplink_core::upload::{
    DeploymentMode, EphemeralCache, HostedStoreClient, RemoteStore, UploadOrchestrator,
};
use uplink_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uplink=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Remote store client
    if config.remote.has_token() {
        info!(api_url = %config.remote.api_url, "Remote store token configured");
    } else {
        warn!(
            api_url = %config.remote.api_url,
            "Remote store token missing, uploads will fall back"
        );
    }
    let remote: Arc<dyn RemoteStore> = Arc::new(
        HostedStoreClient::from_config(&config.remote).context("failed to build HTTP client")?,
    );

    // Local disk fallback only exists for persistent deployments
    let storage = config.storage;
    let disk = match storage.deployment {
        DeploymentMode::Persistent => {
            tokio::fs::create_dir_all(&storage.upload_dir)
                .await
                .with_context(|| {
                    format!("failed to create {}", storage.upload_dir.display())
                })?;
            let store = LocalDiskStore::new(&storage.upload_dir)
                .context("failed to open upload directory")?;
            info!(upload_dir = %storage.upload_dir.display(), "Local disk fallback ready");
            Some(Arc::new(store))
        }
        DeploymentMode::Ephemeral => None,
    };

    let cache = Arc::new(EphemeralCache::new());
    let orchestrator =
        UploadOrchestrator::for_mode(storage.deployment, remote, disk, Arc::clone(&cache));
    info!(
        deployment = %storage.deployment,
        backends = ?orchestrator.chain(),
        max_file_size = storage.max_file_size,
        "Upload pipeline configured"
    );

    // Create application state
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        cache,
        storage: Arc::new(storage),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
