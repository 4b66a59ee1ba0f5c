//! Configuration file parsing for the web server.
//!
//! Loads the bind address, the secrets path, the upload limit and the
//! `[audit]` table from TOML. Every field has a default, so an empty file is
//! a valid configuration.

use auditor_extractor::AuditConfig;
use auditor_llm::DEFAULT_SECRETS_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8501)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// TOML file holding `GEMINI_API_KEY`
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Model and report settings
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8501
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from(DEFAULT_SECRETS_PATH)
}

/// Default upload limit: 50 MiB
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.audit.validate().map_err(ConfigError::Invalid)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            secrets_path: default_secrets_path(),
            max_upload_bytes: default_max_upload_bytes(),
            audit: AuditConfig::default(),
        }
    }
}
