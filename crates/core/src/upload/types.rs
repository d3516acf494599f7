//! Upload domain types.

use std::fmt;

use bytes::Bytes;

use super::error::UploadError;

/// Content type used when the client does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A decoded file upload, owned by the orchestrator for one request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File contents.
    pub bytes: Bytes,
    /// File name as sent by the client.
    pub original_name: String,
    /// MIME type as sent by the client.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
}

impl UploadRequest {
    /// Create a request, deriving `size` from the buffer.
    #[must_use]
    pub fn new(
        bytes: impl Into<Bytes>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        let content_type = content_type.into();
        Self {
            bytes,
            original_name: original_name.into(),
            content_type: if content_type.trim().is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                content_type
            },
            size,
        }
    }

    /// Returns true when the upload carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Identifies an upload strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Hosted third-party object storage.
    RemoteStore,
    /// Directory on the local filesystem.
    LocalDisk,
    /// In-process data-URL cache.
    EphemeralMemory,
}

impl BackendKind {
    /// Stable identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoteStore => "remote_store",
            Self::LocalDisk => "local_disk",
            Self::EphemeralMemory => "ephemeral_memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteStore => f.write_str("remote store"),
            Self::LocalDisk => f.write_str("local disk"),
            Self::EphemeralMemory => f.write_str("ephemeral"),
        }
    }
}

/// What a backend hands back after storing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Public URL (absolute or server-relative).
    pub url: String,
}

/// Normalized outcome of one upload request.
///
/// Exactly one of `file_url` and `error` is set.
#[derive(Debug)]
pub struct UploadResult {
    file_url: Option<String>,
    error: Option<UploadError>,
    used_fallback: bool,
    backend: Option<BackendKind>,
}

impl UploadResult {
    /// Successful upload through `backend`.
    #[must_use]
    pub fn stored(url: impl Into<String>, backend: BackendKind, used_fallback: bool) -> Self {
        Self {
            file_url: Some(url.into()),
            error: None,
            used_fallback,
            backend: Some(backend),
        }
    }

    /// Failed upload.
    #[must_use]
    pub fn failed(error: UploadError) -> Self {
        Self {
            file_url: None,
            error: Some(error),
            used_fallback: false,
            backend: None,
        }
    }

    /// Whether the file was stored.
    #[must_use]
    pub fn success(&self) -> bool {
        self.file_url.is_some()
    }

    /// URL of the stored file.
    #[must_use]
    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    /// Failure cause.
    #[must_use]
    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Failure message.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Whether a backend other than the primary one stored the file.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Whether `file_url` points into the in-process ephemeral cache.
    #[must_use]
    pub fn is_ephemeral_reference(&self) -> bool {
        self.backend == Some(BackendKind::EphemeralMemory)
    }

    /// Backend that stored the file.
    #[must_use]
    pub fn backend(&self) -> Option<BackendKind> {
        self.backend
    }
}
