//! Auditor LLM Provider Layer
//!
//! Streaming text generation against hosted models.
//!
//! # Architecture
//!
//! Every backend implements [`StreamingProvider`]: it takes a
//! [`GenerationRequest`] (system instruction, user parts, temperature) and
//! returns a stream of text fragments in the order the model produced them.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted fragments for testing
//! - `GeminiProvider`: Google Gemini `streamGenerateContent` over server-sent events
//!
//! # Examples
//!
//! ```
//! use auditor_llm::{GenerationRequest, MockProvider, StreamingProvider};
//! use futures_util::StreamExt;
//!
//! # tokio_test_block_on(async {
//! let provider = MockProvider::new(["Hello, ", "world."]);
//! let mut stream = provider.stream_generate(GenerationRequest::new("system"));
//! let mut text = String::new();
//! while let Some(fragment) = stream.next().await {
//!     text.push_str(&fragment.unwrap());
//! }
//! assert_eq!(text, "Hello, world.");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod credentials;
pub mod gemini;
pub mod request;
pub mod sse;

use futures_util::stream::{self, BoxStream, StreamExt};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use credentials::{load_api_key, ApiKey, CredentialsError, API_KEY_NAME, DEFAULT_SECRETS_PATH};
pub use gemini::GeminiProvider;
pub use request::{GenerationRequest, Part, DEFAULT_TEMPERATURE};

/// Stream of text fragments produced by a provider
pub type FragmentStream = BoxStream<'static, Result<String, LlmError>>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Message reported by the API
        message: String,
    },

    /// A streamed event could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model refused to process the prompt
    #[error("Prompt blocked: {0}")]
    Blocked(String),

    /// Quota or rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A text-generation backend that streams its answer
pub trait StreamingProvider: Send + Sync {
    /// Model identifier shown to the user
    fn model(&self) -> &str;

    /// Start a generation. The remote call is made when the stream is first polled.
    fn stream_generate(&self, request: GenerationRequest) -> FragmentStream;
}

impl<P: StreamingProvider + ?Sized> StreamingProvider for Arc<P> {
    fn model(&self) -> &str {
        (**self).model()
    }

    fn stream_generate(&self, request: GenerationRequest) -> FragmentStream {
        (**self).stream_generate(request)
    }
}

/// How a scripted stream ends after its fragments
#[derive(Debug, Clone)]
enum MockEnding {
    Complete,
    Fail { after: usize, message: String },
    Stall { after: usize },
}

/// Mock provider for deterministic testing
///
/// Replays a fixed list of fragments without making any network calls, and
/// can be scripted to fail or hang part-way through the stream.
///
/// # Examples
///
/// ```
/// use auditor_llm::{GenerationRequest, MockProvider, StreamingProvider};
///
/// let provider = MockProvider::new(["a", "b"]).fail_after(1, "quota exceeded");
/// let _stream = provider.stream_generate(GenerationRequest::new("system"));
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    fragments: Vec<String>,
    ending: MockEnding,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a provider that streams the given fragments and completes
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "mock-model".to_string(),
            fragments: fragments.into_iter().map(Into::into).collect(),
            ending: MockEnding::Complete,
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a provider that answers with one fragment
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new([response.into()])
    }

    /// Override the reported model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Emit `after` fragments, then a communication error
    pub fn fail_after(mut self, after: usize, message: impl Into<String>) -> Self {
        self.ending = MockEnding::Fail {
            after,
            message: message.into(),
        };
        self
    }

    /// Emit `after` fragments, then never produce another item
    pub fn stall_after(mut self, after: usize) -> Self {
        self.ending = MockEnding::Stall { after };
        self
    }

    /// Number of times a generation was started
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// The most recent request passed to `stream_generate`
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::with_response("Default mock response")
    }
}

impl StreamingProvider for MockProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn stream_generate(&self, request: GenerationRequest) -> FragmentStream {
        *self.call_count.lock().unwrap() += 1;
        *self.last_request.lock().unwrap() = Some(request);

        let take = match &self.ending {
            MockEnding::Complete => self.fragments.len(),
            MockEnding::Fail { after, .. } | MockEnding::Stall { after } => *after,
        };
        let items: Vec<Result<String, LlmError>> = self
            .fragments
            .iter()
            .take(take)
            .cloned()
            .map(Ok)
            .collect();

        match &self.ending {
            MockEnding::Complete => stream::iter(items).boxed(),
            MockEnding::Fail { message, .. } => {
                let error = LlmError::Communication(message.clone());
                stream::iter(items).chain(stream::once(async move { Err(error) })).boxed()
            }
            MockEnding::Stall { .. } => stream::iter(items).chain(stream::pending()).boxed(),
        }
    }
}
