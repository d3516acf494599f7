//! Local disk store implementation using Apache OpenDAL.

use std::path::Path;

use bytes::Bytes;
use chrono::Utc;
use opendal::{ErrorKind, Operator, services};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use super::error::StorageError;

/// URL prefix under which local files are served.
pub const LOCAL_ROUTE_PREFIX: &str = "/uploads";

/// How many timestamp candidates are tried before giving up on a name.
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Characters left as-is when a file name is placed in a URL path segment.
pub(crate) const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Writes uploaded files into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    operator: Operator,
}

impl LocalDiskStore {
    /// Create a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenDAL fs service cannot be initialized.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let builder = services::Fs::default().root(
            root.as_ref()
                .to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator })
    }

    /// Write `bytes` under a fresh `{unix_millis}-{name}` file and return that name.
    ///
    /// # Errors
    ///
    /// Returns an error if no free name is found or the write fails.
    pub async fn write_unique(
        &self,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        self.write_unique_at(Utc::now().timestamp_millis(), original_name, bytes)
            .await
    }

    /// Same as [`Self::write_unique`] with an explicit starting timestamp.
    ///
    /// Writes are create-only, so an existing file is never overwritten, even
    /// by a concurrent upload of the same name. On a clash the timestamp
    /// component is advanced by one millisecond and the write retried.
    pub(crate) async fn write_unique_at(
        &self,
        millis: i64,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let sanitized = sanitize_filename(original_name);

        let mut name = String::new();
        for offset in 0..MAX_NAME_ATTEMPTS {
            name = format!("{}-{sanitized}", millis + i64::from(offset));
            match self
                .operator
                .write_with(&name, bytes.clone())
                .if_not_exists(true)
                .await
            {
                Ok(_) => return Ok(name),
                Err(e) if e.kind() == ErrorKind::ConditionNotMatch => {
                    debug!(name = %name, "local file name taken, advancing timestamp");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::NameExhausted {
            name,
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Public URL path for a stored file name.
    #[must_use]
    pub fn public_url(name: &str) -> String {
        format!(
            "{LOCAL_ROUTE_PREFIX}/{}",
            utf8_percent_encode(name, PATH_SEGMENT)
        )
    }
}

/// Sanitize filename for local storage.
///
/// Keeps the name readable and only neutralizes what could escape the upload
/// directory or break the filesystem: path separators, NUL and other control
/// characters become `_`, and a name made only of dots becomes `upload`.
pub(crate) fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        sanitized
    }
}
