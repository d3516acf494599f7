//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;
use uplink_core::upload::BackendKind;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Deployment mode the process was started in.
    pub deployment: String,
    /// Upload backends in the order they are tried.
    pub backends: Vec<&'static str>,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        deployment: state.storage.deployment.to_string(),
        backends: state
            .orchestrator
            .chain()
            .into_iter()
            .map(BackendKind::as_str)
            .collect(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
