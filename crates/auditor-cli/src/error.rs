//! Error types for the CLI application.

use auditor_domain::DocumentError;
use auditor_extractor::AuditError;
use auditor_llm::{CredentialsError, LlmError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The API key could not be loaded
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// The provider could not be set up
    #[error("Provider error: {0}")]
    Llm(#[from] LlmError),

    /// The audit could not be set up
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// The input is not an acceptable PDF
    #[error("Invalid document: {0}")]
    Document(#[from] DocumentError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The remote call failed; carries the generic user message
    #[error("{0}")]
    AuditFailed(String),
}
