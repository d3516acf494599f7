//! Upload strategies.
//!
//! Each backend stores a file one way and reports the URL it is reachable
//! under. The orchestrator tries them in order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::utf8_percent_encode;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::debug;

use super::cache::EphemeralCache;
use super::data_url;
use super::error::BackendError;
use super::remote::RemoteStore;
use super::types::{BackendKind, StoredFile, UploadRequest};
use crate::storage::{LocalDiskStore, PATH_SEGMENT};

/// URL prefix under which ephemeral cache entries are served.
pub const EPHEMERAL_ROUTE_PREFIX: &str = "/special-data-url";

/// Length of the random part of an ephemeral key.
const EPHEMERAL_TOKEN_LEN: usize = 12;

/// A single upload strategy.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> BackendKind;

    /// Store the file and return where it can be fetched.
    async fn store(&self, file: &UploadRequest) -> Result<StoredFile, BackendError>;
}

/// Primary strategy: hand the bytes to the hosted remote store.
pub struct RemoteStoreBackend {
    client: Arc<dyn RemoteStore>,
}

impl RemoteStoreBackend {
    /// Wrap a remote store client.
    #[must_use]
    pub fn new(client: Arc<dyn RemoteStore>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadBackend for RemoteStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RemoteStore
    }

    async fn store(&self, file: &UploadRequest) -> Result<StoredFile, BackendError> {
        let url = self
            .client
            .store(file.bytes.clone(), &file.original_name, &file.content_type)
            .await?;
        Ok(StoredFile { url })
    }
}

/// Persistent-mode fallback: write into the local upload directory.
pub struct LocalDiskBackend {
    store: Arc<LocalDiskStore>,
}

impl LocalDiskBackend {
    /// Wrap a local disk store.
    #[must_use]
    pub fn new(store: Arc<LocalDiskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UploadBackend for LocalDiskBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalDisk
    }

    async fn store(&self, file: &UploadRequest) -> Result<StoredFile, BackendError> {
        let name = self
            .store
            .write_unique(&file.original_name, file.bytes.clone())
            .await?;
        Ok(StoredFile {
            url: LocalDiskStore::public_url(&name),
        })
    }
}

/// Ephemeral-mode fallback: keep the file in memory as a data URL.
pub struct EphemeralMemoryBackend {
    cache: Arc<EphemeralCache>,
}

impl EphemeralMemoryBackend {
    /// Wrap the shared ephemeral cache.
    #[must_use]
    pub fn new(cache: Arc<EphemeralCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl UploadBackend for EphemeralMemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::EphemeralMemory
    }

    async fn store(&self, file: &UploadRequest) -> Result<StoredFile, BackendError> {
        let uri = data_url::encode(&file.content_type, &file.bytes)?;
        let key = ephemeral_key();
        let url = ephemeral_url(&key, &file.original_name);

        self.cache.put(key.clone(), uri);
        debug!(key = %key, entries = self.cache.len(), "cached ephemeral upload");

        Ok(StoredFile { url })
    }
}

/// Generates `{unix_millis}-{random alphanumeric token}`.
fn ephemeral_key() -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(EPHEMERAL_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{}-{token}", Utc::now().timestamp_millis())
}

/// Builds the public URL for an ephemeral cache key.
#[must_use]
pub fn ephemeral_url(key: &str, original_name: &str) -> String {
    format!(
        "{EPHEMERAL_ROUTE_PREFIX}/{key}/{}",
        utf8_percent_encode(original_name, PATH_SEGMENT)
    )
}

/// Extracts the cache key from a URL built by [`ephemeral_url`].
#[must_use]
pub fn ephemeral_key_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(EPHEMERAL_ROUTE_PREFIX)?
        .strip_prefix('/')?
        .split('/')
        .next()
        .filter(|key| !key.is_empty())
}
