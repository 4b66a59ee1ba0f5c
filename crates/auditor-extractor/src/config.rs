//! Configuration for the Auditor

use auditor_domain::CsvEncoding;
use auditor_llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use auditor_llm::DEFAULT_TEMPERATURE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which report the model is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportLayout {
    /// Summary, table and CSV with seven columns
    Base,
    /// Same report plus a column of specific items mined from each process
    #[default]
    DataMining,
}

impl fmt::Display for ReportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLayout::Base => write!(f, "base"),
            ReportLayout::DataMining => write!(f, "data-mining"),
        }
    }
}

impl std::str::FromStr for ReportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(ReportLayout::Base),
            "data-mining" => Ok(ReportLayout::DataMining),
            other => Err(format!(
                "Unknown layout '{}' (expected 'base' or 'data-mining')",
                other
            )),
        }
    }
}

/// Configuration for the Auditor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Model identifier sent to the API
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Report layout requested from the model
    #[serde(default)]
    pub layout: ReportLayout,

    /// Prepend a UTF-8 byte-order mark to the CSV download
    #[serde(default = "default_csv_bom")]
    pub csv_bom: bool,

    /// Maximum wait for the next fragment (seconds)
    #[serde(default = "default_fragment_timeout_secs")]
    pub fragment_timeout_secs: u64,

    /// Base URL of the Gemini API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_csv_bom() -> bool {
    true
}

fn default_fragment_timeout_secs() -> u64 {
    120
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl AuditConfig {
    /// Get the fragment timeout as a Duration
    pub fn fragment_timeout(&self) -> Duration {
        Duration::from_secs(self.fragment_timeout_secs)
    }

    /// Encoding of the CSV download
    pub fn csv_encoding(&self) -> CsvEncoding {
        CsvEncoding::from_bom(self.csv_bom)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0 (got {})",
                self.temperature
            ));
        }
        if self.fragment_timeout_secs == 0 {
            return Err("fragment_timeout_secs must be greater than 0".to_string());
        }
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            layout: ReportLayout::default(),
            csv_bom: default_csv_bom(),
            fragment_timeout_secs: default_fragment_timeout_secs(),
            endpoint: default_endpoint(),
        }
    }
}
