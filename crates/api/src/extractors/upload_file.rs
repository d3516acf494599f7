//! Multipart receiver for the single `file` field.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tracing::debug;
use uplink_core::upload::{DEFAULT_CONTENT_TYPE, UploadRequest};
use uplink_shared::{AppError, AppResult};

/// Form field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Slack on top of the file limit for boundaries, headers and other fields.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Reads the `file` field into memory.
///
/// Returns `Ok(None)` when the form has no file part. Fields other than
/// `file`, and `file` parts without a file name, are skipped.
///
/// # Errors
///
/// Returns [`AppError::PayloadTooLarge`] if the file exceeds `max_file_size`
/// or the body limit is hit outside the file part, and
/// [`AppError::Validation`] if the body is not valid multipart.
pub async fn receive_file(
    mut multipart: Multipart,
    max_file_size: usize,
) -> AppResult<Option<UploadRequest>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, body_too_large))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "skipping multipart field");
            continue;
        }
        let Some(original_name) = field.file_name().map(ToString::to_string) else {
            debug!("file field without a file name, skipping");
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, || too_large(max_file_size)))?;
        if bytes.len() > max_file_size {
            return Err(too_large(max_file_size));
        }

        return Ok(Some(UploadRequest::new(bytes, original_name, content_type)));
    }

    Ok(None)
}

fn too_large(max_file_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File too large: maximum size is {max_file_size} bytes"
    ))
}

fn body_too_large() -> AppError {
    AppError::PayloadTooLarge("Request body too large".to_string())
}

/// Maps a multipart failure; `on_limit` builds the error for a body-limit hit.
fn multipart_error(err: MultipartError, on_limit: impl FnOnce() -> AppError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        on_limit()
    } else {
        AppError::Validation(err.body_text())
    }
}
