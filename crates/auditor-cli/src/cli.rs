//! CLI command definitions and argument parsing.

use auditor_extractor::ReportLayout;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Auditor Jurídico - audit legal-process PDFs from the terminal.
#[derive(Debug, Parser)]
#[command(name = "auditor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (same format as the web server's)
    #[arg(short, long, global = true, env = "AUDITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Secrets file holding GEMINI_API_KEY
    #[arg(short, long, global = true)]
    pub secrets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit a PDF, streaming the report and writing the CSV
    Analyze(AnalyzeArgs),

    /// Check that the configuration and API key load
    CheckConfig,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// PDF to audit
    pub pdf: PathBuf,

    /// Where to write the CSV (default: auditoria_juridica.csv next to the PDF)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Report layout: base or data-mining
    #[arg(short, long)]
    pub layout: Option<ReportLayout>,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write the CSV without a byte-order mark
    #[arg(long)]
    pub no_bom: bool,
}
