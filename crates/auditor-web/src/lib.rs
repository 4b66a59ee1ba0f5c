//! Auditor Web
//!
//! Single-page tool: upload a legal-process PDF, watch the audit stream in,
//! download the CSV the model produced.
//!
//! The API key is loaded before the listener is bound; without it the server
//! never starts.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod markdown;

use auditor_extractor::{AuditError, Auditor};
use auditor_llm::{load_api_key, ApiKey, CredentialsError, GeminiProvider, LlmError, StreamingProvider};
use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Web server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The API key could not be loaded
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// The HTTP client could not be built
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    /// The audit settings were rejected
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the state for a provider
pub fn app_state(
    provider: Arc<dyn StreamingProvider>,
    config: &ServerConfig,
) -> Result<AppState, ServerError> {
    let auditor = Auditor::new(provider, config.audit.clone())?;
    Ok(AppState {
        auditor: Arc::new(auditor),
        max_upload_bytes: config.max_upload_bytes,
    })
}

/// Build the state backed by Gemini
pub fn gemini_state(api_key: ApiKey, config: &ServerConfig) -> Result<AppState, ServerError> {
    let provider = GeminiProvider::new(api_key, config.audit.model.clone())?
        .with_endpoint(config.audit.endpoint.clone());
    app_state(Arc::new(provider), config)
}

/// Start the web server
///
/// Loads the API key, builds the auditor and serves until the process ends.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let api_key = load_api_key(&config.secrets_path)?;
    let state = gemini_state(api_key, &config)?;

    info!("Starting Auditor Jurídico");
    info!("Model: {}", config.audit.model);
    info!("Layout: {}", config.audit.layout);
    info!("Upload limit: {} bytes", config.max_upload_bytes);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on http://{}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_secrets_file_stops_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            secrets_path: dir.path().join("secrets.toml"),
            bind_port: 0,
            ..ServerConfig::default()
        };

        let err = start_server(config).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Credentials(CredentialsError::FileNotFound(_))
        ));
        assert!(err.to_string().starts_with("Secrets file not found"));
    }

    #[tokio::test]
    async fn test_missing_key_stops_startup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"OTHER = \"x\"\n").unwrap();
        let config = ServerConfig {
            secrets_path: file.path().to_path_buf(),
            bind_port: 0,
            ..ServerConfig::default()
        };

        let err = start_server(config).await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Credentials(CredentialsError::KeyMissing(_))
        ));
    }

    #[test]
    fn test_gemini_state_uses_configured_model() {
        let mut config = ServerConfig::default();
        config.audit.model = "gemini-2.5-pro".to_string();

        let state = gemini_state(ApiKey::new("k"), &config).unwrap();
        assert_eq!(state.auditor.model(), "gemini-2.5-pro");
        assert_eq!(state.max_upload_bytes, config.max_upload_bytes);
    }
}
