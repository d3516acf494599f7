//! Application configuration management.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Remote store configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Whether the host filesystem survives between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Local writes do not persist (serverless hosts).
    Ephemeral,
    /// Long-running host with a durable upload directory.
    #[default]
    Persistent,
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ephemeral => f.write_str("ephemeral"),
            Self::Persistent => f.write_str("persistent"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Deployment mode, selects the fallback strategy.
    #[serde(default)]
    pub deployment: DeploymentMode,
    /// Directory for local disk fallback files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Directory holding the front-end assets.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            deployment: DeploymentMode::default(),
            upload_dir: default_upload_dir(),
            public_dir: default_public_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_file_size() -> usize {
    StorageConfig::DEFAULT_MAX_FILE_SIZE
}

/// Hosted remote store configuration.
#[derive(Clone, Deserialize)]
pub struct RemoteConfig {
    /// Upload endpoint of the hosted storage API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API token. An empty token is allowed; calls fail at the remote end.
    #[serde(default)]
    pub token: String,
    /// Optional request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RemoteConfig {
    /// Returns true when a non-empty token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: String::new(),
            timeout_secs: None,
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_url", &self.api_url)
            .field("token", &if self.has_token() { "***" } else { "" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    "https://api.uploadthing.com/v6/uploadFiles".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Besides `UPLINK__*` variables, the platform variables `PORT`,
    /// `VERCEL` and `UPLOADTHING_TOKEN` are honored.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let vercel = std::env::var("VERCEL").is_ok_and(|v| v == "1");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("UPLINK").separator("__"))
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("storage.deployment", vercel.then_some("ephemeral"))?
            .set_override_option("remote.token", std::env::var("UPLOADTHING_TOKEN").ok())?
            .build()?;

        config.try_deserialize()
    }
}
