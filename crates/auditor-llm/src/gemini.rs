//! Gemini Provider Implementation
//!
//! Streams answers from Google's Generative Language API using
//! `models/{model}:streamGenerateContent?alt=sse`.
//!
//! # Features
//!
//! - Inline binary parts (the PDF travels base64-encoded in the request body)
//! - System instruction and temperature per request
//! - Incremental decoding of the server-sent event body
//! - Connect timeout only; a long answer is never cut off mid-stream
//!
//! # Examples
//!
//! ```no_run
//! use auditor_llm::{ApiKey, GeminiProvider};
//!
//! let provider = GeminiProvider::new(ApiKey::new("key"), "gemini-flash-latest").unwrap();
//! ```

use crate::credentials::ApiKey;
use crate::request::{GenerationRequest, Part};
use crate::sse::SseDecoder;
use crate::{FragmentStream, LlmError, StreamingProvider};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Default timeout for establishing the connection (30 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider against the public endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: ApiKey, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    /// Point the provider at a different base URL (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full streaming URL for the configured model
    pub fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.endpoint, self.model
        )
    }
}

impl StreamingProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn stream_generate(&self, request: GenerationRequest) -> FragmentStream {
        let state = StreamState::Connecting {
            client: self.client.clone(),
            url: self.stream_url(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            body: Box::new(GeminiRequest::from(&request)),
        };
        stream::unfold(state, advance).boxed()
    }
}

/// Progress of one streamed generation
enum StreamState {
    Connecting {
        client: reqwest::Client,
        url: String,
        api_key: ApiKey,
        model: String,
        body: Box<GeminiRequest>,
    },
    Receiving {
        body: BoxStream<'static, Result<Vec<u8>, LlmError>>,
        decoder: SseDecoder,
        pending: VecDeque<Result<String, LlmError>>,
    },
    /// Body ended or failed; hand out what was already decoded
    Draining {
        pending: VecDeque<Result<String, LlmError>>,
    },
}

async fn advance(state: StreamState) -> Option<(Result<String, LlmError>, StreamState)> {
    let mut state = state;
    loop {
        state = match state {
            StreamState::Connecting {
                client,
                url,
                api_key,
                model,
                body,
            } => match connect(&client, &url, &api_key, &model, &body).await {
                Ok(response) => StreamState::Receiving {
                    body: response
                        .bytes_stream()
                        .map(|chunk| {
                            chunk.map(|bytes| bytes.to_vec()).map_err(|e| {
                                LlmError::Communication(format!("Stream interrupted: {}", e))
                            })
                        })
                        .boxed(),
                    decoder: SseDecoder::new(),
                    pending: VecDeque::new(),
                },
                Err(e) => StreamState::Draining {
                    pending: VecDeque::from([Err(e)]),
                },
            },
            StreamState::Receiving {
                mut body,
                mut decoder,
                mut pending,
            } => {
                if let Some(item) = pending.pop_front() {
                    return Some((
                        item,
                        StreamState::Receiving {
                            body,
                            decoder,
                            pending,
                        },
                    ));
                }

                match body.next().await {
                    Some(Ok(chunk)) => match decoder.feed(&chunk) {
                        Ok(events) => {
                            if queue_events(events, &mut pending) {
                                StreamState::Receiving {
                                    body,
                                    decoder,
                                    pending,
                                }
                            } else {
                                StreamState::Draining { pending }
                            }
                        }
                        Err(e) => {
                            pending.push_back(Err(e));
                            StreamState::Draining { pending }
                        }
                    },
                    Some(Err(e)) => {
                        pending.push_back(Err(e));
                        StreamState::Draining { pending }
                    }
                    None => {
                        queue_events(decoder.finish(), &mut pending);
                        StreamState::Draining { pending }
                    }
                }
            }
            StreamState::Draining { mut pending } => {
                return pending
                    .pop_front()
                    .map(|item| (item, StreamState::Draining { pending }));
            }
        };
    }
}

async fn connect(
    client: &reqwest::Client,
    url: &str,
    api_key: &ApiKey,
    model: &str,
    body: &GeminiRequest,
) -> Result<reqwest::Response, LlmError> {
    debug!("Opening Gemini stream for model {}", model);

    let response = client
        .post(url)
        .header("x-goog-api-key", api_key.expose())
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!("Gemini returned HTTP {}", status);

    Err(match status {
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        _ => LlmError::Http {
            status: status.as_u16(),
            message: api_error_message(&error_text),
        },
    })
}

/// Decode events into the queue, stopping at the first bad one. Returns false
/// once an error has been queued.
fn queue_events(events: Vec<String>, pending: &mut VecDeque<Result<String, LlmError>>) -> bool {
    for data in events {
        match parse_event(&data) {
            Ok(Some(text)) => pending.push_back(Ok(text)),
            Ok(None) => {}
            Err(e) => {
                pending.push_back(Err(e));
                return false;
            }
        }
    }
    true
}

/// Extract the text carried by one streamed event
///
/// Returns `Ok(None)` for events without text (usage metadata, finish markers).
pub fn parse_event(data: &str) -> Result<Option<String>, LlmError> {
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse event: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::Http {
            status: error.code.unwrap_or(500),
            message: error.message,
        });
    }

    if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::Blocked(reason));
    }

    let Some(candidate) = chunk.candidates.into_iter().next() else {
        return Ok(None);
    };

    if let Some(reason) = &candidate.finish_reason {
        debug!("Gemini finish reason: {}", reason);
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for streamGenerateContent
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiContent,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

impl From<&GenerationRequest> for GeminiRequest {
    fn from(request: &GenerationRequest) -> Self {
        let parts = request
            .parts()
            .iter()
            .map(|part| match part {
                Part::Text(text) => GeminiPart::Text { text: text.clone() },
                Part::InlineData { mime_type, data } => GeminiPart::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: BASE64.encode(data),
                    },
                },
            })
            .collect();

        Self {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts,
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: request.system_instruction().to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature(),
            },
        }
    }
}

/// One event of the streamed response
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<u16>,
    message: String,
}
