//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use auditor_domain::{PdfDocument, EXPORT_FILE_NAME};
use auditor_extractor::{AuditEvent, AuditReport, Auditor};
use auditor_llm::{load_api_key, GeminiProvider, StreamingProvider};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, mut config: Config, formatter: &Formatter) -> Result<()> {
    if let Some(layout) = args.layout {
        config.audit.layout = layout;
    }
    if let Some(model) = args.model {
        config.audit.model = model;
    }
    if args.no_bom {
        config.audit.csv_bom = false;
    }

    let api_key = load_api_key(&config.secrets_path)?;
    let document = read_document(&args.pdf)?;
    let out = args.out.unwrap_or_else(|| default_output_path(&args.pdf));

    let provider = GeminiProvider::new(api_key, config.audit.model.clone())?
        .with_endpoint(config.audit.endpoint.clone());
    let auditor = Arc::new(Auditor::new(provider, config.audit)?);

    let stdout = std::io::stdout();
    run_audit(&auditor, document, &out, formatter, &mut stdout.lock()).await?;
    Ok(())
}

/// Load a PDF from disk
pub fn read_document(path: &Path) -> Result<PdfDocument> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(PdfDocument::new(file_name, bytes)?)
}

/// `auditoria_juridica.csv` in the PDF's directory
pub fn default_output_path(pdf: &Path) -> PathBuf {
    pdf.with_file_name(EXPORT_FILE_NAME)
}

/// Stream one audit to `out`, writing the CSV to `csv_path` when present
///
/// Status lines go to stderr so `out` carries only the report.
pub async fn run_audit<P, W>(
    auditor: &Arc<Auditor<P>>,
    document: PdfDocument,
    csv_path: &Path,
    formatter: &Formatter,
    out: &mut W,
) -> Result<AuditReport>
where
    P: StreamingProvider + 'static,
    W: Write,
{
    let mut events = auditor.spawn(document);

    while let Some(event) = events.recv().await {
        match event {
            AuditEvent::Started {
                audit_id,
                model,
                file_name,
            } => {
                debug!("Audit {} started", audit_id);
                eprintln!("{}", formatter.model_status(&model));
                eprintln!("{}", formatter.info(&format!("Analisando {}...", file_name)));
                eprintln!();
                eprintln!("{}", formatter.heading("Relatório de Auditoria"));
            }
            AuditEvent::Fragment(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
            }
            AuditEvent::Completed(report) => {
                writeln!(out)?;
                match report.outcome.export() {
                    Some(export) => {
                        std::fs::write(csv_path, export.to_bytes())?;
                        eprintln!(
                            "{}",
                            formatter.success(&format!(
                                "CSV com {} linhas salvo em {}",
                                export.line_count(),
                                csv_path.display()
                            ))
                        );
                    }
                    None => {
                        if let Some(warning) = report.outcome.warning() {
                            eprintln!("{}", formatter.warning(warning));
                        }
                    }
                }
                return Ok(report);
            }
            AuditEvent::Failed { message, .. } => {
                writeln!(out)?;
                return Err(CliError::AuditFailed(message));
            }
        }
    }

    Err(CliError::AuditFailed(
        "Ocorreu um erro: audit ended without a result".to_string(),
    ))
}
