//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("server.port cannot be 0")]
    InvalidPort,

    #[error("database.path cannot be empty")]
    EmptyDatabasePath,

    #[error("openai.api_key is missing (set it in the config file or OPENAI_API_KEY)")]
    MissingApiKey,
}

/// Raw HTTP server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Raw database configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

impl Default for FileDatabaseConfig {
    fn default() -> Self {
        Self {
            path: "hustings.db".to_string(),
        }
    }
}

/// Raw generation backend configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Override the API base URL (for proxies and tests)
    pub base_url: Option<String>,
}

impl FileOpenAiConfig {
    /// Resolve the API key, preferring the config file over the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// HTTP server settings
    pub server: FileServerConfig,
    /// Database settings
    pub database: FileDatabaseConfig,
    /// Generation backend settings
    pub openai: FileOpenAiConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatabasePath);
        }
        Ok(())
    }
}
