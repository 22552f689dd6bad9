//! Generation gateway over the assistants streaming API.

use crate::openai::protocol::{self, CreateThreadAndRunRequest};
use crate::openai::transport::SseDecoder;
use async_trait::async_trait;
use futures::StreamExt;
use hustings_application::{AnswerStream, GenerationGateway};
use hustings_domain::{GenerationError, GenerationEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Buffer between the HTTP read loop and the stream consumer.
const STREAM_BUFFER: usize = 32;

/// [`GenerationGateway`] adapter for the OpenAI assistants API.
///
/// Holds one explicitly constructed HTTP client for the process lifetime;
/// injected into the use cases at startup.
pub struct OpenAiGenerationGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiGenerationGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the gateway at a different endpoint (testing, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerationGateway for OpenAiGenerationGateway {
    async fn stream_answer(
        &self,
        backend_assistant_id: &str,
        question: &str,
    ) -> Result<AnswerStream, GenerationError> {
        let request = CreateThreadAndRunRequest::for_question(backend_assistant_id, question);

        let response = self
            .client
            .post(format!("{}/threads/runs", self.base_url))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::BackendUnavailable(format!(
                "run request returned {}: {}",
                status, body
            )));
        }

        debug!("Opened generation stream for assistant {}", backend_assistant_id);

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let assistant_id = backend_assistant_id.to_string();
        tokio::spawn(async move {
            read_run_stream(response, tx, assistant_id).await;
        });

        Ok(AnswerStream::new(rx))
    }
}

/// Read-loop task for one streaming run.
///
/// Decodes SSE frames off the chunked body and forwards generation events.
/// Exactly one terminal event is sent. A failed send means the consumer
/// dropped the stream; the task returns, dropping the response and closing
/// the remote call.
async fn read_run_stream(
    response: reqwest::Response,
    tx: mpsc::Sender<GenerationEvent>,
    assistant_id: String,
) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Stream for assistant {} broke: {}", assistant_id, e);
                let _ = tx
                    .send(GenerationEvent::Failed(GenerationError::Transport(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        for frame in decoder.feed(&chunk) {
            match frame.event.as_str() {
                "thread.message.delta" => match protocol::parse_delta(&frame.data) {
                    Ok((text, annotations)) => {
                        if tx
                            .send(GenerationEvent::Delta { text, annotations })
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(GenerationEvent::Failed(err)).await;
                        return;
                    }
                },
                "thread.message.completed" => {
                    let event = match protocol::parse_completed(&frame.data) {
                        Ok((text, annotations)) => {
                            GenerationEvent::Completed { text, annotations }
                        }
                        Err(err) => GenerationEvent::Failed(err),
                    };
                    let _ = tx.send(event).await;
                    return;
                }
                "thread.run.failed" => {
                    let _ = tx
                        .send(GenerationEvent::Failed(GenerationError::Transport(
                            format!("run failed: {}", frame.data),
                        )))
                        .await;
                    return;
                }
                // Step/run bookkeeping events and "done" carry nothing we need.
                _ => {}
            }
        }
    }

    // Body ended without a completed message.
    let _ = tx
        .send(GenerationEvent::Failed(GenerationError::Transport(
            "generation stream ended without completing".to_string(),
        )))
        .await;
}
