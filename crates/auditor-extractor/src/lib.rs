//! Auditor Extractor
//!
//! Runs a legal-process PDF through the model and turns the streamed answer
//! into a report and, when the model supplied one, a CSV download.
//!
//! # Architecture
//!
//! ```text
//! PDF → PromptBuilder → StreamingProvider → fragments → Transcript → CSV block
//!                                               ↓
//!                                         AuditEvent channel → page / terminal
//! ```
//!
//! # Example Usage
//!
//! ```
//! use auditor_domain::PdfDocument;
//! use auditor_extractor::{AuditConfig, AuditEvent, Auditor};
//! use auditor_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(["Resumo\n", "```csv\nA;B\n1;2\n```"]);
//! let auditor = Arc::new(Auditor::new(provider, AuditConfig::default()).unwrap());
//!
//! let document = PdfDocument::new("relatorio.pdf", b"%PDF-1.7".to_vec()).unwrap();
//! let mut events = auditor.spawn(document);
//!
//! while let Some(event) = events.recv().await {
//!     if let AuditEvent::Completed(report) = event {
//!         assert_eq!(report.outcome.export().unwrap().payload(), "A;B\n1;2");
//!     }
//! }
//! # });
//! ```

#![warn(missing_docs)]

mod auditor;
mod config;
mod error;
pub mod parser;
mod prompt;
mod types;


pub use auditor::{Auditor, EVENT_BUFFER};
pub use config::{AuditConfig, ReportLayout};
pub use error::{AuditError, FAILURE_PREFIX};
pub use parser::{extract_csv, find_csv_block};
pub use prompt::{PromptBuilder, USER_INSTRUCTION};
pub use types::{AuditEvent, AuditReport, ExtractionOutcome, MISSING_CSV_WARNING};
