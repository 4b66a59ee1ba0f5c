//! Auditor Domain Layer
//!
//! Value types shared by every other crate in the workspace. The only
//! external dependency is `uuid`, used for audit identifiers.
//!
//! ## Key Concepts
//!
//! - **Audit**: one analysis of one uploaded document, identified by an [`AuditId`]
//! - **Document**: the uploaded PDF bytes, held in memory for a single request
//! - **Transcript**: the model's answer, accumulated fragment by fragment in arrival order
//! - **Export**: the CSV block found in the transcript, rendered as a downloadable file
//!
//! Nothing here is persisted. Every value lives for the duration of one request.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod document;
pub mod export;
pub mod transcript;

// Re-exports for convenience
pub use audit::AuditId;
pub use document::{DocumentError, PdfDocument, PDF_MIME_TYPE};
pub use export::{CsvEncoding, CsvExport, EXPORT_FILE_NAME, UTF8_BOM};
pub use transcript::Transcript;
