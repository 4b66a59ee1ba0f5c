//! HTTP request handlers for the web server.
//!
//! Serves the upload page, runs audits as server-sent events, and turns a CSV
//! payload into a download.

use crate::markdown::render_markdown;
use auditor_domain::{CsvExport, DocumentError, PdfDocument, Transcript};
use auditor_extractor::{AuditEvent, AuditReport, Auditor};
use auditor_llm::StreamingProvider;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

const ENCODING_FAILURE: &str = r#"{"audit_id":"","message":"Ocorreu um erro: falha interna"}"#;

/// Multipart field carrying the PDF
pub const FILE_FIELD: &str = "file";

/// Auditor over any provider, shared by all requests
pub type SharedAuditor = Arc<Auditor<Arc<dyn StreamingProvider>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runs the audits
    pub auditor: SharedAuditor,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the server is up
    pub status: String,
    /// Model audits are sent to
    pub model: String,
}

/// Body of `POST /export`
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// CSV payload from a `completed` event
    pub csv: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// `data` of a `started` event
#[derive(Debug, Serialize, Deserialize)]
pub struct StartedPayload {
    /// Audit id
    pub audit_id: String,
    /// Model name
    pub model: String,
    /// Uploaded file name
    pub file_name: String,
}

/// `data` of a `fragment` event
#[derive(Debug, Serialize, Deserialize)]
pub struct FragmentPayload {
    /// Next piece of the answer
    pub text: String,
    /// Everything received so far, rendered from markdown
    pub html: String,
}

/// `data` of a `completed` event
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletedPayload {
    /// Audit id
    pub audit_id: String,
    /// Fragments relayed
    pub fragment_count: usize,
    /// Duration of the remote call
    pub elapsed_ms: u64,
    /// CSV payload, when a block was found
    pub csv: Option<String>,
    /// Suggested download name, when a block was found
    pub file_name: Option<String>,
    /// Lines in the CSV, header included
    pub line_count: Option<usize>,
    /// Shown instead of the download when no block was found
    pub warning: Option<String>,
}

/// `data` of an `error` event
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Audit id
    pub audit_id: String,
    /// Generic user-facing message
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The form carried no `file` part
    MissingFile,
    /// The upload is empty or not a PDF
    Document(DocumentError),
    /// The multipart body could not be read (includes the size limit)
    Multipart(MultipartError),
    /// Nothing to export
    EmptyExport,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "Selecione um arquivo PDF antes de analisar.".to_string(),
            ),
            AppError::Document(DocumentError::Empty) => (
                StatusCode::BAD_REQUEST,
                "O arquivo enviado está vazio.".to_string(),
            ),
            AppError::Document(DocumentError::NotPdf) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Apenas arquivos PDF são aceitos.".to_string(),
            ),
            AppError::Multipart(e) => (e.status(), e.body_text()),
            AppError::EmptyExport => (
                StatusCode::BAD_REQUEST,
                "Nenhum dado CSV para exportar.".to_string(),
            ),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        AppError::Document(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Multipart(e)
    }
}

/// GET / - Upload page
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(INDEX_HTML.replace("{{model}}", &escape_html(state.auditor.model())))
}

/// POST /analyze - Run an audit and stream its events
///
/// Validation failures are answered with a JSON error before the model is
/// called. Once the stream starts, failures arrive as an `error` event.
async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((file_name, bytes));
            break;
        }
    }

    let (file_name, bytes) = upload.ok_or(AppError::MissingFile)?;
    let document = PdfDocument::new(file_name, bytes.to_vec()).map_err(|e| {
        warn!("Rejected upload: {}", e);
        AppError::from(e)
    })?;

    info!("Accepted '{}' ({} bytes)", document.file_name(), document.len());
    let events = state.auditor.spawn(document);

    // Dropping the receiver (client gone) stops the audit at its next send
    let stream = stream::unfold(
        (events, Transcript::new()),
        |(mut events, mut transcript)| async move {
            let event = events.recv().await?;
            let sse = to_sse_event(event, &mut transcript);
            Some((Ok(sse), (events, transcript)))
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// POST /export - Encode a CSV payload as a download
async fn export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let payload = request.csv.trim();
    if payload.is_empty() {
        return Err(AppError::EmptyExport);
    }

    let export = CsvExport::new(payload, state.auditor.config().csv_encoding());
    let disposition = format!("attachment; filename=\"{}\"", export.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.to_bytes(),
    )
        .into_response())
}

/// GET /health - Liveness check
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model: state.auditor.model().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/export", post(export))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn to_sse_event(event: AuditEvent, transcript: &mut Transcript) -> Event {
    match event {
        AuditEvent::Started {
            audit_id,
            model,
            file_name,
        } => json_event(
            "started",
            &StartedPayload {
                audit_id: audit_id.to_string(),
                model,
                file_name,
            },
        ),
        AuditEvent::Fragment(text) => {
            transcript.push(&text);
            let html = render_markdown(transcript.as_str());
            json_event("fragment", &FragmentPayload { text, html })
        }
        AuditEvent::Completed(report) => json_event("completed", &completed_payload(report)),
        AuditEvent::Failed { audit_id, message } => json_event(
            "error",
            &ErrorPayload {
                audit_id: audit_id.to_string(),
                message,
            },
        ),
    }
}

fn completed_payload(report: AuditReport) -> CompletedPayload {
    let export = report.outcome.export();
    CompletedPayload {
        audit_id: report.audit_id.to_string(),
        fragment_count: report.fragment_count,
        elapsed_ms: report.elapsed_ms,
        csv: export.map(|e| e.payload().to_string()),
        file_name: export.map(|e| e.file_name().to_string()),
        line_count: export.map(CsvExport::line_count),
        warning: report.outcome.warning().map(str::to_string),
    }
}

// Text travels JSON-encoded so line breaks inside fragments survive framing.
fn json_event<T: Serialize>(name: &'static str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| {
            error!("Failed to encode {} event: {}", name, e);
            Event::default().event("error").data(ENCODING_FAILURE)
        })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
