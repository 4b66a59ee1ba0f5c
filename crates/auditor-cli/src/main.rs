//! Auditor CLI - audit legal-process PDFs from the terminal.

use auditor_cli::commands;
use auditor_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let formatter = Formatter::new(!cli.no_color);

    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&format!("Error: {}", e)));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, formatter: &Formatter) -> auditor_cli::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(secrets) = cli.secrets {
        config.secrets_path = secrets;
    }

    match cli.command {
        Command::Analyze(args) => commands::execute_analyze(args, config, formatter).await?,
        Command::CheckConfig => commands::execute_check_config(&config, formatter)?,
    }

    Ok(())
}
