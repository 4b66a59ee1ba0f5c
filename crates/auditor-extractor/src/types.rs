//! Types produced by an audit

use auditor_domain::{AuditId, CsvExport};

/// Warning shown when the answer has no usable CSV block
pub const MISSING_CSV_WARNING: &str =
    "Não foi possível encontrar o bloco CSV na resposta. O relatório acima continua disponível.";

/// Result of looking for the CSV block in the final answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// A fenced block was found
    Export(CsvExport),
    /// No fenced block, or only a blank one
    Missing,
}

impl ExtractionOutcome {
    /// The export, if one was found
    pub fn export(&self) -> Option<&CsvExport> {
        match self {
            ExtractionOutcome::Export(export) => Some(export),
            ExtractionOutcome::Missing => None,
        }
    }

    /// Warning to show instead of a download
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            ExtractionOutcome::Export(_) => None,
            ExtractionOutcome::Missing => Some(MISSING_CSV_WARNING),
        }
    }
}

/// A finished audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Id used to correlate events and logs
    pub audit_id: AuditId,
    /// Model that produced the answer
    pub model: String,
    /// Full answer in arrival order
    pub text: String,
    /// Number of non-empty fragments relayed
    pub fragment_count: usize,
    /// Wall time of the remote call (milliseconds)
    pub elapsed_ms: u64,
    /// CSV extraction result
    pub outcome: ExtractionOutcome,
}

/// Progress of an audit, in the order a client sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// The request was accepted and the remote call is about to start
    Started {
        /// Audit id
        audit_id: AuditId,
        /// Model name
        model: String,
        /// Uploaded file name
        file_name: String,
    },
    /// The next piece of the answer
    Fragment(String),
    /// The stream ended normally
    Completed(AuditReport),
    /// The remote call failed; `message` is the generic user-facing text
    Failed {
        /// Audit id
        audit_id: AuditId,
        /// Message to show
        message: String,
    },
}
