//! Retrieval of ephemeral-mode uploads.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;
use uplink_core::upload::DEFAULT_CONTENT_TYPE;
use uplink_shared::AppError;

use crate::{AppState, error::ApiError};

const NOT_FOUND_BODY: &str = "File not found or expired";

/// Creates the ephemeral retrieval route.
///
/// The trailing file name only makes the URL readable; lookup uses the key.
pub fn routes() -> Router<AppState> {
    Router::new().route("/special-data-url/{id}/{filename}", get(serve_data_url))
}

async fn serve_data_url(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> Response {
    let Some(data) = state.cache.resolve(&id) else {
        debug!(key = %id, filename = %filename, "ephemeral upload not found");
        return ApiError(AppError::NotFound(NOT_FOUND_BODY.to_string())).into_text_response();
    };

    let content_type = HeaderValue::from_str(&data.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    ([(header::CONTENT_TYPE, content_type)], data.bytes).into_response()
}
