//! HTTP API layer with Axum routes and static file serving.
//!
//! This crate provides:
//! - The upload and ephemeral retrieval routes
//! - The multipart receiver
//! - JSON error responses
//! - Static serving of `/uploads` and the public directory

pub mod error;
pub mod extractors;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uplink_core::storage::LOCAL_ROUTE_PREFIX;
use uplink_core::upload::{EphemeralCache, UploadOrchestrator};
use uplink_shared::StorageConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline for the configured deployment mode.
    pub orchestrator: Arc<UploadOrchestrator>,
    /// Ephemeral-mode uploads, read by the retrieval route.
    pub cache: Arc<EphemeralCache>,
    /// Directories and size limit.
    pub storage: Arc<StorageConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.storage.upload_dir);
    let public = ServeDir::new(&state.storage.public_dir)
        .fallback(ServeFile::new(state.storage.public_dir.join("index.html")));

    Router::new()
        .nest("/api", routes::api_routes(state.storage.max_file_size))
        .merge(routes::data_url::routes())
        .nest_service(LOCAL_ROUTE_PREFIX, uploads)
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
