//! Integration tests for the web server

use auditor_llm::{MockProvider, StreamingProvider};
use auditor_web::{
    app_state,
    config::ServerConfig,
    handlers::{
        create_router, CompletedPayload, ErrorResponse, FragmentPayload, HealthCheckResponse,
    },
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "auditor-test-boundary";
const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<< >>\nendobj\n";

fn create_test_app(provider: MockProvider, config: &ServerConfig) -> Router {
    let provider: Arc<dyn StreamingProvider> = Arc::new(provider);
    create_router(app_state(provider, config).unwrap())
}

/// Build a multipart body with one part per `(name, file_name, bytes)`
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                    name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn analyze_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Split an SSE body into `(event, data)` pairs
fn parse_events(body: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8(body.to_vec()).unwrap();
    text.split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event: ") {
                    name = Some(value.to_string());
                } else if let Some(value) = line.strip_prefix("data: ") {
                    data.push(value);
                }
            }
            name.map(|name| (name, data.join("\n")))
        })
        .collect()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app(MockProvider::default().with_model("gemini-test"), &ServerConfig::default());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthCheckResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.model, "gemini-test");
}

#[tokio::test]
async fn test_index_page() {
    let app = create_test_app(
        MockProvider::default().with_model("gemini-flash-latest"),
        &ServerConfig::default(),
    );

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("⚖️ Auditor Jurídico - Análise de Processos"));
    assert!(html.contains("Status: Conectado ao modelo <strong>gemini-flash-latest</strong>"));
    assert!(html.contains("Faça upload do relatório processual (PDF)"));
    assert!(html.contains("<button id=\"analyze\" disabled>Analisar Documento</button>"));
}

#[tokio::test]
async fn test_analyze_without_file_never_calls_model() {
    let provider = MockProvider::default();
    let app = create_test_app(provider.clone(), &ServerConfig::default());

    let response = app
        .oneshot(analyze_request(&[("note", None, b"hello")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(error.error.contains("PDF"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_empty_file() {
    let provider = MockProvider::default();
    let app = create_test_app(provider.clone(), &ServerConfig::default());

    let response = app
        .oneshot(analyze_request(&[("file", Some("vazio.pdf"), b"")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_rejects_non_pdf() {
    let provider = MockProvider::default();
    let app = create_test_app(provider.clone(), &ServerConfig::default());

    let response = app
        .oneshot(analyze_request(&[("file", Some("notes.txt"), b"just text")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_rejects_oversized_upload() {
    let provider = MockProvider::default();
    let config = ServerConfig {
        max_upload_bytes: 64,
        ..ServerConfig::default()
    };
    let app = create_test_app(provider.clone(), &config);

    let big = [b'%'; 1024];
    let response = app
        .oneshot(analyze_request(&[("file", Some("big.pdf"), &big)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_analyze_streams_events() {
    let provider = MockProvider::new(["Hello, ", "world.\n", "```csv\nA;B\n1;2\n```"]);
    let app = create_test_app(provider.clone(), &ServerConfig::default());

    let response = app
        .oneshot(analyze_request(&[("file", Some("relatorio.pdf"), PDF)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let events = parse_events(&body_bytes(response).await);
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["started", "fragment", "fragment", "fragment", "completed"]);

    let text: String = events
        .iter()
        .filter(|(name, _)| name == "fragment")
        .map(|(_, data)| {
            let value: serde_json::Value = serde_json::from_str(data).unwrap();
            value["text"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(text, "Hello, world.\n```csv\nA;B\n1;2\n```");

    let completed: CompletedPayload = serde_json::from_str(&events[4].1).unwrap();
    assert_eq!(completed.csv.as_deref(), Some("A;B\n1;2"));
    assert_eq!(completed.file_name.as_deref(), Some("auditoria_juridica.csv"));
    assert_eq!(completed.fragment_count, 3);
    assert!(completed.warning.is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_fragments_carry_rendered_markdown() {
    let provider = MockProvider::new([
        "## PARTE 2: TABELA VISUAL\n\n",
        "| Nº Processo | Status |\n|---|---|\n",
        "| 0001 | Ativo |\n",
    ]);
    let app = create_test_app(provider, &ServerConfig::default());

    let response = app
        .oneshot(analyze_request(&[("file", Some("relatorio.pdf"), PDF)]))
        .await
        .unwrap();

    let events = parse_events(&body_bytes(response).await);
    let fragments: Vec<FragmentPayload> = events
        .iter()
        .filter(|(name, _)| name == "fragment")
        .map(|(_, data)| serde_json::from_str(data).unwrap())
        .collect();
    assert_eq!(fragments.len(), 3);

    // Each fragment re-renders everything received so far
    assert!(fragments[0].html.contains("<h2>PARTE 2: TABELA VISUAL</h2>"));
    let last = &fragments[2].html;
    assert!(last.contains("<h2>PARTE 2: TABELA VISUAL</h2>"));
    assert!(last.contains("<table>"));
    assert!(last.contains("<td>0001</td>"));
    assert!(last.contains("<td>Ativo</td>"));
    assert!(!last.contains("|---|"));
}

#[tokio::test]
async fn test_analyze_without_csv_block_warns() {
    let app = create_test_app(
        MockProvider::with_response("Resumo sem tabela."),
        &ServerConfig::default(),
    );

    let response = app
        .oneshot(analyze_request(&[("file", Some("relatorio.pdf"), PDF)]))
        .await
        .unwrap();

    let events = parse_events(&body_bytes(response).await);
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "completed");

    let completed: CompletedPayload = serde_json::from_str(data).unwrap();
    assert!(completed.csv.is_none());
    assert!(completed.warning.is_some());
}

#[tokio::test]
async fn test_remote_failure_becomes_error_event() {
    let provider = MockProvider::new(["parcial"]).fail_after(1, "quota exceeded");
    let app = create_test_app(provider.clone(), &ServerConfig::default());

    let response = app
        .clone()
        .oneshot(analyze_request(&[("file", Some("relatorio.pdf"), PDF)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = parse_events(&body_bytes(response).await);
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    let value: serde_json::Value = serde_json::from_str(data).unwrap();
    assert!(value["message"]
        .as_str()
        .unwrap()
        .starts_with("Ocorreu um erro: "));

    // The server keeps serving and accepts another attempt
    let response = app
        .oneshot(analyze_request(&[("file", Some("relatorio.pdf"), PDF)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = parse_events(&body_bytes(response).await);
    assert_eq!(events.first().unwrap().0, "started");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_export_with_bom() {
    let app = create_test_app(MockProvider::default(), &ServerConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"csv": "Numero_Processo;Valor_Causa\n0001;R$ 1.000,00"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"auditoria_juridica.csv\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    assert_eq!(&bytes[3..], "Numero_Processo;Valor_Causa\n0001;R$ 1.000,00".as_bytes());
}

#[tokio::test]
async fn test_export_without_bom() {
    let mut config = ServerConfig::default();
    config.audit.csv_bom = false;
    let app = create_test_app(MockProvider::default(), &config);

    let request = Request::builder()
        .method("POST")
        .uri("/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"csv": "A;B"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_bytes(response).await, b"A;B");
}

#[tokio::test]
async fn test_export_rejects_blank_payload() {
    let app = create_test_app(MockProvider::default(), &ServerConfig::default());

    let request = Request::builder()
        .method("POST")
        .uri("/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"csv": "   "}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
