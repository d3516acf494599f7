//! Upload orchestration.
//!
//! A file goes to the hosted remote store first. When that fails, the chain
//! for the deployment mode takes over:
//!
//! ```text
//!   persistent:  RemoteStore ──fail──▶ LocalDisk        (/uploads/{ts}-{name})
//!   ephemeral:   RemoteStore ──fail──▶ EphemeralMemory  (/special-data-url/{key}/{name})
//! ```
//!
//! The orchestrator always returns an [`UploadResult`]; it never propagates an
//! error or a panic to the caller.

mod backend;
mod cache;
pub mod data_url;
mod error;
mod orchestrator;
mod remote;
mod types;

pub use backend::{
    EPHEMERAL_ROUTE_PREFIX, EphemeralMemoryBackend, LocalDiskBackend, RemoteStoreBackend,
    UploadBackend, ephemeral_key_from_url, ephemeral_url,
};
pub use cache::EphemeralCache;
pub use data_url::{DataUrl, DataUrlError};
pub use error::{BackendError, RemoteStoreError, UploadError};
pub use orchestrator::UploadOrchestrator;
pub use remote::{HostedStoreClient, RemoteStore};
pub use types::{BackendKind, DEFAULT_CONTENT_TYPE, StoredFile, UploadRequest, UploadResult};
pub use uplink_shared::DeploymentMode;
