//! Provider-neutral generation requests

use std::fmt;

/// Default sampling temperature; low, so repeated audits of the same file agree
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// One piece of user content
#[derive(Clone, PartialEq)]
pub enum Part {
    /// Plain text
    Text(String),
    /// Binary content sent inline, tagged with its MIME type
    InlineData {
        /// MIME type, e.g. `application/pdf`
        mime_type: String,
        /// Raw bytes
        data: Vec<u8>,
    },
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Part::InlineData { mime_type, data } => f
                .debug_struct("InlineData")
                .field("mime_type", mime_type)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// A single-turn generation: system instruction, user parts, sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    system_instruction: String,
    parts: Vec<Part>,
    temperature: f32,
}

impl GenerationRequest {
    /// Create a request with the given system instruction and no user parts
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            parts: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Append inline binary content
    pub fn with_inline_data(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.parts.push(Part::InlineData {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// Append a text part
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// System instruction
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// User parts, in order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Sampling temperature
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}
