//! Local disk storage using Apache OpenDAL.
//!
//! Backs the persistent-mode fallback: files land in a directory that the
//! HTTP layer serves under `/uploads`.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                Apache OpenDAL                  │
//! │               (services::Fs)                   │
//! ├───────────────────────────────────────────────┤
//! │ op.write_with("{ts}-{name}").if_not_exists()  │
//! └───────────────────────────────────────────────┘
//! ```

mod error;
mod service;

pub use error::StorageError;
pub use service::{LOCAL_ROUTE_PREFIX, LocalDiskStore};
pub(crate) use service::PATH_SEGMENT;
