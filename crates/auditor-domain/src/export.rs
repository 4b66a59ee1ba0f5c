//! Downloadable CSV export

/// File name offered to the browser
pub const EXPORT_FILE_NAME: &str = "auditoria_juridica.csv";

/// UTF-8 byte-order mark, which makes spreadsheet tools detect the encoding
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Byte encoding of the exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvEncoding {
    /// Plain UTF-8
    Utf8,
    /// UTF-8 prefixed with a byte-order mark
    #[default]
    Utf8Bom,
}

impl CsvEncoding {
    /// Pick an encoding from a BOM flag
    pub fn from_bom(bom: bool) -> Self {
        if bom {
            CsvEncoding::Utf8Bom
        } else {
            CsvEncoding::Utf8
        }
    }
}

/// Semicolon-delimited data found in the model's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    payload: String,
    encoding: CsvEncoding,
}

impl CsvExport {
    /// Create an export from an already-trimmed payload
    pub fn new(payload: impl Into<String>, encoding: CsvEncoding) -> Self {
        Self {
            payload: payload.into(),
            encoding,
        }
    }

    /// The CSV text, without any byte-order mark
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Encoding used by [`CsvExport::to_bytes`]
    pub fn encoding(&self) -> CsvEncoding {
        self.encoding
    }

    /// File name to offer for download
    pub fn file_name(&self) -> &'static str {
        EXPORT_FILE_NAME
    }

    /// Number of lines, header included
    pub fn line_count(&self) -> usize {
        self.payload.lines().count()
    }

    /// Header line, if any
    pub fn header(&self) -> Option<&str> {
        self.payload.lines().next()
    }

    /// Render the file contents
    ///
    /// # Examples
    ///
    /// ```
    /// use auditor_domain::{CsvEncoding, CsvExport};
    ///
    /// let export = CsvExport::new("A;B\n1;2", CsvEncoding::Utf8Bom);
    /// assert_eq!(&export.to_bytes()[..3], &[0xEF, 0xBB, 0xBF]);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + self.payload.len());
        if self.encoding == CsvEncoding::Utf8Bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(self.payload.as_bytes());
        bytes
    }
}
