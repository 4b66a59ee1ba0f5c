//! Auditor Web server
//!
//! Serves the upload page and the audit endpoints.

use auditor_web::{config::ServerConfig, start_server, ServerError};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Auditor Jurídico - legal-process PDF audits in the browser
#[derive(Debug, Parser)]
#[command(name = "auditor-web")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "AUDITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Secrets file holding GEMINI_API_KEY
    #[arg(short, long)]
    secrets: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(secrets) = args.secrets {
        config.secrets_path = secrets;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    start_server(config).await
}
