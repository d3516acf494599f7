//! Shared errors and configuration for Uplink.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DeploymentMode, RemoteConfig, ServerConfig, StorageConfig};
pub use error::{AppError, AppResult};
