//! In-process cache for ephemeral-mode uploads.
//!
//! Holds `key -> data URL` pairs for the lifetime of the process. There is no
//! eviction and no TTL; every entry stays until restart.

use dashmap::DashMap;
use tracing::debug;

use super::data_url::{self, DataUrl};

/// Concurrent key to data-URL map shared by the ephemeral backend and the
/// retrieval endpoint.
#[derive(Debug, Default)]
pub struct EphemeralCache {
    entries: DashMap<String, String>,
}

impl EphemeralCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a data URL under `key`, replacing any previous value.
    pub fn put(&self, key: impl Into<String>, data_uri: impl Into<String>) {
        self.entries.insert(key.into(), data_uri.into());
    }

    /// Returns the raw data URL stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Looks up `key` and decodes its data URL.
    ///
    /// An entry that fails to decode is reported as absent.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<DataUrl> {
        let uri = self.get(key)?;
        match data_url::decode(&uri) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(key = %key, error = %e, "cached data URL failed to decode");
                None
            }
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
