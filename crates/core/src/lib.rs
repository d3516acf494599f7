//! Core upload logic for Uplink.
//!
//! This crate contains the upload domain with ZERO web framework dependencies.
//!
//! # Modules
//!
//! - `upload` - Request/result types, backend chain, orchestrator, ephemeral cache
//! - `storage` - Local disk store used by the persistent-mode fallback

pub mod storage;
pub mod upload;
