//! File upload route.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};
use serde::Serialize;
use tracing::{debug, info};
use uplink_core::upload::{BackendKind, UploadResult};
use uplink_shared::AppError;

use crate::{
    AppState,
    error::ApiError,
    extractors::{MULTIPART_OVERHEAD, receive_file},
};

const LOCAL_FALLBACK_NOTE: &str = "Using local storage fallback";

/// Creates the upload routes.
pub fn routes(max_file_size: usize) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload_file).layer(DefaultBodyLimit::max(
            max_file_size.saturating_add(MULTIPART_OVERHEAD),
        )),
    )
}

/// Successful upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Public URL of the stored file.
    pub file_url: String,
    /// Set when a fallback backend stored the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_fallback: Option<bool>,
    /// Set when the URL points at the in-memory cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_data_url: Option<bool>,
    /// Human-readable note for the local disk fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl UploadResponse {
    fn from_result(result: &UploadResult) -> Result<Self, ApiError> {
        if let Some(err) = result.error() {
            return Err(AppError::from(err).into());
        }
        let file_url = result
            .file_url()
            .ok_or_else(|| AppError::Internal("upload produced no URL".to_string()))?
            .to_string();

        let local_fallback =
            result.used_fallback() && result.backend() == Some(BackendKind::LocalDisk);

        Ok(Self {
            success: true,
            file_url,
            used_fallback: result.used_fallback().then_some(true),
            is_data_url: result.is_ephemeral_reference().then_some(true),
            note: local_fallback.then_some(LOCAL_FALLBACK_NOTE),
        })
    }
}

/// Receives one file and runs it through the backend chain.
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let request = match multipart {
        Ok(multipart) => receive_file(multipart, state.storage.max_file_size).await?,
        Err(rejection) => {
            debug!(error = %rejection, "request is not multipart");
            None
        }
    };

    let result = state.orchestrator.handle_upload(request).await;
    let response = UploadResponse::from_result(&result)?;

    info!(
        url = %response.file_url,
        backend = ?result.backend().map(BackendKind::as_str),
        used_fallback = result.used_fallback(),
        "upload stored"
    );

    Ok(Json(response))
}
