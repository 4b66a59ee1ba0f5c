//! Locate the CSV block in the model's answer

use crate::types::ExtractionOutcome;
use auditor_domain::{CsvEncoding, CsvExport};
use regex::Regex;
use std::sync::LazyLock;

/// First fenced block, optionally tagged `csv`, across lines
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:csv)?\s*(.*?)\s*```").expect("fenced block pattern is valid")
});

/// Trimmed interior of the first fenced block, if it has any content
///
/// # Examples
///
/// ```
/// use auditor_extractor::parser::find_csv_block;
///
/// let text = "Resumo...\n```csv\nA;B\n1;2\n```\n";
/// assert_eq!(find_csv_block(text), Some("A;B\n1;2"));
/// assert_eq!(find_csv_block("no block here"), None);
/// ```
pub fn find_csv_block(text: &str) -> Option<&str> {
    let interior = FENCED_BLOCK.captures(text)?.get(1)?.as_str().trim();
    if interior.is_empty() {
        None
    } else {
        Some(interior)
    }
}

/// Apply the extraction rule to a finished answer
pub fn extract_csv(text: &str, encoding: CsvEncoding) -> ExtractionOutcome {
    match find_csv_block(text) {
        Some(payload) => ExtractionOutcome::Export(CsvExport::new(payload, encoding)),
        None => ExtractionOutcome::Missing,
    }
}
