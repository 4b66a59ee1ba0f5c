//! Error types for the Auditor

use auditor_llm::LlmError;
use thiserror::Error;

/// Prefix of every failure message shown to the user
pub const FAILURE_PREFIX: &str = "Ocorreu um erro";

/// Errors that can occur while running an audit
#[derive(Error, Debug)]
pub enum AuditError {
    /// The remote model failed
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// No fragment arrived within the idle timeout
    #[error("No response from the model for {0} seconds")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Nobody is listening for events any more
    #[error("Audit cancelled: client went away")]
    Cancelled,
}

impl AuditError {
    /// Generic message rendered on the page and in the terminal
    pub fn user_message(&self) -> String {
        format!("{}: {}", FAILURE_PREFIX, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_wraps_cause() {
        let err = AuditError::from(LlmError::RateLimitExceeded);
        assert_eq!(err.user_message(), "Ocorreu um erro: Rate limit exceeded");
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            AuditError::Timeout(120).to_string(),
            "No response from the model for 120 seconds"
        );
    }
}
