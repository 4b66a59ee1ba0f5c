//! Configuration for the CLI.
//!
//! Reads the same TOML file as the web server and keeps only what an audit
//! needs; server keys such as `bind_port` are ignored.

use crate::error::{CliError, Result};
use auditor_extractor::AuditConfig;
use auditor_llm::DEFAULT_SECRETS_PATH;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// TOML file holding `GEMINI_API_KEY`
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,

    /// Model and report settings
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_secrets_path() -> PathBuf {
    PathBuf::from(DEFAULT_SECRETS_PATH)
}

impl Config {
    /// Load configuration from a file, or use defaults when none is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.audit.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secrets_path: default_secrets_path(),
            audit: AuditConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditor_extractor::ReportLayout;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.secrets_path, PathBuf::from("config/secrets.toml"));
    }

    #[test]
    fn test_ignores_server_keys() {
        let config = Config::from_toml(
            r#"
            bind_port = 8501
            secrets_path = "other/secrets.toml"

            [audit]
            layout = "base"
            "#,
        )
        .unwrap();
        assert_eq!(config.secrets_path, PathBuf::from("other/secrets.toml"));
        assert_eq!(config.audit.layout, ReportLayout::Base);
    }

    #[test]
    fn test_invalid_audit_section() {
        let err = Config::from_toml("[audit]\nfragment_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
