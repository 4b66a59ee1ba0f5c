//! Core Auditor implementation

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::parser::extract_csv;
use crate::prompt::PromptBuilder;
use crate::types::{AuditEvent, AuditReport, ExtractionOutcome};
use auditor_domain::{AuditId, PdfDocument, Transcript};
use auditor_llm::{GenerationRequest, StreamingProvider};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Events buffered between the audit task and its consumer
pub const EVENT_BUFFER: usize = 64;

/// Runs one PDF through the model and relays the answer as events
pub struct Auditor<P>
where
    P: StreamingProvider,
{
    provider: P,
    config: AuditConfig,
    prompt: PromptBuilder,
}

impl<P> Auditor<P>
where
    P: StreamingProvider + 'static,
{
    /// Create a new Auditor, rejecting an invalid configuration
    pub fn new(provider: P, config: AuditConfig) -> Result<Self, AuditError> {
        config.validate().map_err(AuditError::Config)?;
        let prompt = PromptBuilder::new(config.layout);
        Ok(Self {
            provider,
            config,
            prompt,
        })
    }

    /// Model the provider talks to
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Active configuration
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Request that would be sent for `document`
    pub fn build_request(&self, document: PdfDocument) -> GenerationRequest {
        self.prompt.build(document, self.config.temperature)
    }

    /// Run an audit, sending progress to `events`
    ///
    /// Fragments are sent in arrival order. The caller sees failures as an
    /// `Err`; no `Failed` event is sent. Use [`Auditor::relay`] to have
    /// failures reported on the channel instead.
    pub async fn run(
        &self,
        document: PdfDocument,
        events: &mpsc::Sender<AuditEvent>,
    ) -> Result<AuditReport, AuditError> {
        self.execute(AuditId::new(), document, events).await
    }

    /// Run an audit and report its failure, if any, as a `Failed` event
    ///
    /// This is the boundary where remote errors become the generic message.
    pub async fn relay(
        &self,
        document: PdfDocument,
        events: mpsc::Sender<AuditEvent>,
    ) -> Option<AuditReport> {
        let audit_id = AuditId::new();
        match self.execute(audit_id, document, &events).await {
            Ok(report) => Some(report),
            Err(AuditError::Cancelled) => {
                info!("Audit {} cancelled: receiver dropped", audit_id);
                None
            }
            Err(e) => {
                error!("Audit {} failed: {}", audit_id, e);
                let failed = AuditEvent::Failed {
                    audit_id,
                    message: e.user_message(),
                };
                if events.send(failed).await.is_err() {
                    debug!("Audit {} failure not delivered: receiver dropped", audit_id);
                }
                None
            }
        }
    }

    /// Start an audit on its own task and return the event receiver
    pub fn spawn(self: &Arc<Self>, document: PdfDocument) -> mpsc::Receiver<AuditEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let auditor = Arc::clone(self);
        tokio::spawn(async move {
            auditor.relay(document, tx).await;
        });
        rx
    }

    async fn execute(
        &self,
        audit_id: AuditId,
        document: PdfDocument,
        events: &mpsc::Sender<AuditEvent>,
    ) -> Result<AuditReport, AuditError> {
        let model = self.model().to_string();
        info!(
            "Starting audit {} of '{}' ({} bytes) with model {}",
            audit_id,
            document.file_name(),
            document.len(),
            model
        );

        send(
            events,
            AuditEvent::Started {
                audit_id,
                model: model.clone(),
                file_name: document.file_name().to_string(),
            },
        )
        .await?;

        let request = self.build_request(document);
        debug!(
            "System instruction length: {} chars, layout {}",
            request.system_instruction().len(),
            self.config.layout
        );

        let started_at = Instant::now();
        let idle = self.config.fragment_timeout();
        let mut stream = self.provider.stream_generate(request);
        let mut transcript = Transcript::new();

        // The first item waits on upload and time to first token, so only
        // the gaps after it are bounded.
        let mut first = true;
        loop {
            let next = if first {
                first = false;
                stream.next().await
            } else {
                timeout(idle, stream.next())
                    .await
                    .map_err(|_| AuditError::Timeout(self.config.fragment_timeout_secs))?
            };

            match next {
                Some(fragment) => {
                    let fragment = fragment?;
                    if transcript.push(&fragment) {
                        send(events, AuditEvent::Fragment(fragment)).await?;
                    }
                }
                None => break,
            }
        }

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        let fragment_count = transcript.fragment_count();
        let text = transcript.into_string();
        debug!("Answer length: {} chars in {} fragments", text.len(), fragment_count);

        let outcome = extract_csv(&text, self.config.csv_encoding());
        match &outcome {
            ExtractionOutcome::Export(export) => info!(
                "Audit {} finished in {} ms, CSV with {} lines",
                audit_id,
                elapsed_ms,
                export.line_count()
            ),
            ExtractionOutcome::Missing => warn!(
                "Audit {} finished in {} ms without a CSV block",
                audit_id, elapsed_ms
            ),
        }

        let report = AuditReport {
            audit_id,
            model,
            text,
            fragment_count,
            elapsed_ms,
            outcome,
        };

        send(events, AuditEvent::Completed(report.clone())).await?;
        Ok(report)
    }
}

async fn send(events: &mpsc::Sender<AuditEvent>, event: AuditEvent) -> Result<(), AuditError> {
    events.send(event).await.map_err(|_| AuditError::Cancelled)
}
