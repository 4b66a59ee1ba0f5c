//! Secret loading for the hosted model
//!
//! The API key lives in a TOML secrets file:
//!
//! ```toml
//! GEMINI_API_KEY = "..."
//! ```
//!
//! A missing file and a missing key are reported as different errors so the
//! operator knows which one to fix.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the key inside the secrets file
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";

/// Where binaries look for secrets when no path is given
pub const DEFAULT_SECRETS_PATH: &str = "config/secrets.toml";

/// Failures while loading the API key
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The secrets file does not exist
    #[error("Secrets file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but has no usable `GEMINI_API_KEY`
    #[error("Key 'GEMINI_API_KEY' not found in {}", .0.display())]
    KeyMissing(PathBuf),

    /// The file could not be read
    #[error("Failed to read secrets file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML
    #[error("Failed to parse secrets TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// An API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Load `GEMINI_API_KEY` from a secrets file
///
/// An empty or non-string value counts as missing.
pub fn load_api_key(path: impl AsRef<Path>) -> Result<ApiKey, CredentialsError> {
    let path = path.as_ref();

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CredentialsError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(CredentialsError::Io(e)),
    };

    let table: toml::Table = toml::from_str(&contents)?;
    match table.get(API_KEY_NAME).and_then(|v| v.as_str()).map(str::trim) {
        Some(key) if !key.is_empty() => Ok(ApiKey::new(key)),
        _ => Err(CredentialsError::KeyMissing(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn secrets_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_key() {
        let file = secrets_file("GEMINI_API_KEY = \"abc123\"\n");
        let key = load_api_key(file.path()).unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        let err = load_api_key(&path).unwrap_err();
        assert!(matches!(err, CredentialsError::FileNotFound(p) if p == path));
    }

    #[test]
    fn test_missing_key() {
        let file = secrets_file("OTHER_KEY = \"x\"\n");
        let err = load_api_key(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::KeyMissing(_)));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let file = secrets_file("GEMINI_API_KEY = \"   \"\n");
        assert!(matches!(
            load_api_key(file.path()).unwrap_err(),
            CredentialsError::KeyMissing(_)
        ));
    }

    #[test]
    fn test_non_string_key_counts_as_missing() {
        let file = secrets_file("GEMINI_API_KEY = 42\n");
        assert!(matches!(
            load_api_key(file.path()).unwrap_err(),
            CredentialsError::KeyMissing(_)
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let file = secrets_file("GEMINI_API_KEY = \n");
        assert!(matches!(
            load_api_key(file.path()).unwrap_err(),
            CredentialsError::Parse(_)
        ));
    }

    #[test]
    fn test_messages_are_distinct() {
        let missing_file = CredentialsError::FileNotFound(PathBuf::from("config/secrets.toml"));
        let missing_key = CredentialsError::KeyMissing(PathBuf::from("config/secrets.toml"));
        assert_eq!(
            missing_file.to_string(),
            "Secrets file not found: config/secrets.toml"
        );
        assert_eq!(
            missing_key.to_string(),
            "Key 'GEMINI_API_KEY' not found in config/secrets.toml"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
