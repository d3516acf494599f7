//! Upload error types.

use thiserror::Error;
use uplink_shared::AppError;

use super::data_url::DataUrlError;
use super::types::BackendKind;
use crate::storage::StorageError;

/// Hosted remote store errors.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// The HTTP request could not be built or sent.
    #[error("remote store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote store answered with a non-success status.
    #[error("remote store returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The remote store reported an error for the file.
    #[error("remote store rejected upload: {0}")]
    Rejected(String),

    /// The response decoded but carried no usable URL.
    #[error("no URL in remote store response")]
    MissingUrl,

    /// The response body did not match the expected schema.
    #[error("invalid remote store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised by a single upload backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Remote store failure.
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),

    /// Local disk failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Payload could not be turned into a data URL.
    #[error("data URL encoding failed: {0}")]
    Encoding(#[from] DataUrlError),
}

/// Outcome errors of the upload orchestrator.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Request carried no file or an empty one.
    #[error("No file uploaded")]
    NoFile,

    /// The only configured backend failed.
    #[error("{kind} upload failed: {message}")]
    Backend {
        /// Backend that failed.
        kind: BackendKind,
        /// Failure message.
        message: String,
    },

    /// The primary backend and every fallback failed.
    #[error("Both {primary} and {fallback} fallback failed")]
    FallbackExhausted {
        /// First backend in the chain.
        primary: BackendKind,
        /// Last backend in the chain.
        fallback: BackendKind,
        /// Per-backend failure messages, in chain order.
        causes: Vec<String>,
    },

    /// Unexpected fault, including a panicking backend.
    #[error("{0}")]
    Internal(String),
}

impl UploadError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoFile => 400,
            Self::Backend { .. } | Self::FallbackExhausted { .. } | Self::Internal(_) => 500,
        }
    }
}

impl From<&UploadError> for AppError {
    fn from(err: &UploadError) -> Self {
        match err {
            UploadError::NoFile => Self::Validation(err.to_string()),
            UploadError::Backend { .. } | UploadError::FallbackExhausted { .. } => {
                Self::ExternalService(err.to_string())
            }
            UploadError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}
