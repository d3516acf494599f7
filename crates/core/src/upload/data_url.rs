//! `data:<mime>;base64,<payload>` encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Data URL codec errors.
#[derive(Debug, Error)]
pub enum DataUrlError {
    /// The string does not start with `data:`.
    #[error("missing data: scheme")]
    MissingScheme,

    /// The `;base64,` marker is absent.
    #[error("data URL is not base64 encoded")]
    NotBase64,

    /// MIME type is empty or cannot round-trip through a data URL.
    #[error("invalid MIME type for data URL: {0:?}")]
    InvalidMimeType(String),

    /// Payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Decoded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// MIME type recorded in the URL.
    pub mime_type: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Encode `bytes` as a data URL.
///
/// # Errors
///
/// Returns [`DataUrlError::InvalidMimeType`] if the MIME type is empty, contains
/// control characters, or contains the `;base64,` marker.
pub fn encode(mime_type: &str, bytes: &[u8]) -> Result<String, DataUrlError> {
    if mime_type.is_empty()
        || mime_type.contains(BASE64_MARKER)
        || mime_type.chars().any(char::is_control)
    {
        return Err(DataUrlError::InvalidMimeType(mime_type.to_string()));
    }

    Ok(format!("{SCHEME}{mime_type}{BASE64_MARKER}{}", STANDARD.encode(bytes)))
}

/// Decode a data URL produced by [`encode`].
///
/// # Errors
///
/// Returns an error if the string does not follow `data:<mime>;base64,<payload>`.
pub fn decode(uri: &str) -> Result<DataUrl, DataUrlError> {
    let rest = uri.strip_prefix(SCHEME).ok_or(DataUrlError::MissingScheme)?;
    let (mime_type, payload) = rest
        .rsplit_once(BASE64_MARKER)
        .ok_or(DataUrlError::NotBase64)?;

    if mime_type.is_empty() {
        return Err(DataUrlError::InvalidMimeType(String::new()));
    }

    Ok(DataUrl {
        mime_type: mime_type.to_string(),
        bytes: STANDARD.decode(payload)?,
    })
}
