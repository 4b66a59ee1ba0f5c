//! Accumulated model output

/// The model's answer, built from streamed fragments
///
/// Fragments are appended in the order they arrive; the final text is their
/// plain concatenation. Empty fragments (chunks carrying no text) are ignored.
///
/// # Examples
///
/// ```
/// use auditor_domain::Transcript;
///
/// let mut transcript = Transcript::new();
/// transcript.push("Hello, ");
/// transcript.push("");
/// transcript.push("world.");
/// assert_eq!(transcript.as_str(), "Hello, world.");
/// assert_eq!(transcript.fragment_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    fragment_count: usize,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Returns false if the fragment was empty and skipped.
    pub fn push(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        self.fragment_count += 1;
        true
    }

    /// Text received so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of non-empty fragments received
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Length of the text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True until the first non-empty fragment arrives
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consume the transcript, returning the text
    pub fn into_string(self) -> String {
        self.text
    }
}
