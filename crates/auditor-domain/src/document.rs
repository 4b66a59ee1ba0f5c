//! Uploaded documents
//!
//! The tool only ever handles one PDF per request. The bytes are kept in
//! memory and dropped with the request; nothing inspects the PDF structure
//! beyond the file signature.

use std::fmt;
use thiserror::Error;

/// MIME type attached to the document when it is sent to the model
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Every PDF starts with this signature
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Reasons an upload is rejected before any remote call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// No bytes were uploaded
    #[error("uploaded file is empty")]
    Empty,
    /// The bytes do not carry a PDF signature
    #[error("uploaded file is not a PDF")]
    NotPdf,
}

/// A PDF held in memory for the duration of one audit
#[derive(Clone, PartialEq, Eq)]
pub struct PdfDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl PdfDocument {
    /// Wrap uploaded bytes, checking that they look like a PDF
    ///
    /// # Examples
    ///
    /// ```
    /// use auditor_domain::{DocumentError, PdfDocument};
    ///
    /// let doc = PdfDocument::new("relatorio.pdf", b"%PDF-1.7\n...".to_vec()).unwrap();
    /// assert_eq!(doc.file_name(), "relatorio.pdf");
    ///
    /// let err = PdfDocument::new("notes.txt", b"hello".to_vec()).unwrap_err();
    /// assert_eq!(err, DocumentError::NotPdf);
    /// ```
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if !looks_like_pdf(&bytes) {
            return Err(DocumentError::NotPdf);
        }

        let mut file_name = file_name.into();
        if file_name.trim().is_empty() {
            file_name = "documento.pdf".to_string();
        }

        Ok(Self { file_name, bytes })
    }

    /// Name the file had on the client
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a constructed document; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type to tag the document with
    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }

    /// Give up the document, keeping only its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// Keep multi-megabyte payloads out of debug output and logs.
impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDocument")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check the signature, tolerating leading whitespace some generators emit
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .take(1024)
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(0);
    bytes[start..].starts_with(PDF_MAGIC)
}
