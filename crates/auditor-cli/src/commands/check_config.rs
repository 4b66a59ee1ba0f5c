//! Check-config command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use auditor_llm::{load_api_key, API_KEY_NAME};

/// Execute the check-config command.
///
/// Fails with the same distinct messages the web server uses at startup.
pub fn execute_check_config(config: &Config, formatter: &Formatter) -> Result<()> {
    load_api_key(&config.secrets_path)?;

    println!(
        "{}",
        formatter.success(&format!(
            "{} found in {}",
            API_KEY_NAME,
            config.secrets_path.display()
        ))
    );
    println!("{}", formatter.model_status(&config.audit.model));
    println!("{}", formatter.info(&format!("Layout: {}", config.audit.layout)));
    println!(
        "{}",
        formatter.info(&format!(
            "CSV encoding: {}",
            if config.audit.csv_bom { "UTF-8 with BOM" } else { "UTF-8" }
        ))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use auditor_llm::CredentialsError;

    #[test]
    fn test_missing_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            secrets_path: dir.path().join("secrets.toml"),
            ..Config::default()
        };

        let err = execute_check_config(&config, &Formatter::new(false)).unwrap_err();
        assert!(matches!(
            err,
            CliError::Credentials(CredentialsError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_valid_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GEMINI_API_KEY = \"abc\"\n").unwrap();
        let config = Config {
            secrets_path: path,
            ..Config::default()
        };

        assert!(execute_check_config(&config, &Formatter::new(false)).is_ok());
    }
}
