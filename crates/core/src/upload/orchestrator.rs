//! Upload orchestrator: runs the backend chain and normalizes the outcome.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use super::backend::{EphemeralMemoryBackend, LocalDiskBackend, RemoteStoreBackend, UploadBackend};
use super::cache::EphemeralCache;
use super::error::UploadError;
use super::remote::RemoteStore;
use super::types::{BackendKind, UploadRequest, UploadResult};
use crate::storage::LocalDiskStore;
use uplink_shared::DeploymentMode;

/// Tries each configured backend in order until one stores the file.
///
/// Every strategy is attempted exactly once; there are no retries.
pub struct UploadOrchestrator {
    backends: Vec<Arc<dyn UploadBackend>>,
}

impl UploadOrchestrator {
    /// Create an orchestrator over an explicit backend chain.
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn UploadBackend>>) -> Self {
        Self { backends }
    }

    /// Remote store first, local disk as fallback.
    #[must_use]
    pub fn persistent(remote: Arc<dyn RemoteStore>, disk: Arc<LocalDiskStore>) -> Self {
        Self::new(vec![
            Arc::new(RemoteStoreBackend::new(remote)),
            Arc::new(LocalDiskBackend::new(disk)),
        ])
    }

    /// Remote store first, in-memory data URL as fallback.
    #[must_use]
    pub fn ephemeral(remote: Arc<dyn RemoteStore>, cache: Arc<EphemeralCache>) -> Self {
        Self::new(vec![
            Arc::new(RemoteStoreBackend::new(remote)),
            Arc::new(EphemeralMemoryBackend::new(cache)),
        ])
    }

    /// Build the chain for a deployment mode.
    ///
    /// `disk` is only consulted in persistent mode; without it the chain has
    /// no fallback.
    #[must_use]
    pub fn for_mode(
        mode: DeploymentMode,
        remote: Arc<dyn RemoteStore>,
        disk: Option<Arc<LocalDiskStore>>,
        cache: Arc<EphemeralCache>,
    ) -> Self {
        match (mode, disk) {
            (DeploymentMode::Persistent, Some(disk)) => Self::persistent(remote, disk),
            (DeploymentMode::Persistent, None) => {
                Self::new(vec![Arc::new(RemoteStoreBackend::new(remote))])
            }
            (DeploymentMode::Ephemeral, _) => Self::ephemeral(remote, cache),
        }
    }

    /// Backend kinds in chain order.
    #[must_use]
    pub fn chain(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    /// Store an uploaded file.
    ///
    /// Never fails and never unwinds: every error, including a panicking
    /// backend, is folded into the returned [`UploadResult`].
    pub async fn handle_upload(&self, request: Option<UploadRequest>) -> UploadResult {
        let Some(request) = request.filter(|r| !r.is_empty()) else {
            warn!("upload request carried no file");
            return UploadResult::failed(UploadError::NoFile);
        };

        info!(
            name = %request.original_name,
            content_type = %request.content_type,
            size = request.size,
            "upload received"
        );

        match AssertUnwindSafe(self.run_chain(&request))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(error = %message, "upload backend panicked");
                UploadResult::failed(UploadError::Internal(message))
            }
        }
    }

    async fn run_chain(&self, request: &UploadRequest) -> UploadResult {
        let mut causes = Vec::with_capacity(self.backends.len());

        for (index, backend) in self.backends.iter().enumerate() {
            let kind = backend.kind();
            match backend.store(request).await {
                Ok(stored) => {
                    let used_fallback = index > 0;
                    if used_fallback {
                        info!(backend = kind.as_str(), url = %stored.url, "stored via fallback");
                    } else {
                        info!(backend = kind.as_str(), url = %stored.url, "stored");
                    }
                    return UploadResult::stored(stored.url, kind, used_fallback);
                }
                Err(e) => {
                    warn!(backend = kind.as_str(), error = %e, "upload backend failed");
                    causes.push(format!("{kind}: {e}"));
                }
            }
        }

        let error = match self.backends.as_slice() {
            [] => UploadError::Internal("no upload backends configured".to_string()),
            [only] => UploadError::Backend {
                kind: only.kind(),
                message: causes.pop().unwrap_or_default(),
            },
            [primary, .., last] => UploadError::FallbackExhausted {
                primary: primary.kind(),
                fallback: last.kind(),
                causes,
            },
        };

        error!(error = %error, "all upload backends failed");
        UploadResult::failed(error)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "upload backend panicked".to_string()
    }
}
