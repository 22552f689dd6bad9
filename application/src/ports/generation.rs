//! Generation gateway port
//!
//! Defines the interface to the remote streaming text-generation backend.

use async_trait::async_trait;
use hustings_domain::{GenerationError, GenerationEvent};
use tokio::sync::mpsc;

/// Gateway to the generation backend.
///
/// One call per party per ask: opens a streaming run for the given backend
/// assistant and question text. The adapter owns the HTTP client; it is
/// constructed once at startup and injected.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Open one streaming generation call.
    ///
    /// Fails with [`GenerationError::BackendUnavailable`] when the call
    /// cannot be opened at all; mid-stream failures arrive as a terminal
    /// [`GenerationEvent::Failed`] on the returned stream.
    async fn stream_answer(
        &self,
        backend_assistant_id: &str,
        question: &str,
    ) -> Result<AnswerStream, GenerationError>;
}

/// Handle for receiving one party's streaming generation events.
///
/// Wraps an `mpsc::Receiver<GenerationEvent>`: the adapter's read loop runs
/// on its own task and pushes events in, so the consumer side is purely
/// pull-based. Single-pass — no replay or rewind. Dropping the handle
/// closes the channel, which the adapter treats as cancellation.
pub struct AnswerStream {
    receiver: mpsc::Receiver<GenerationEvent>,
}

impl AnswerStream {
    pub fn new(receiver: mpsc::Receiver<GenerationEvent>) -> Self {
        Self { receiver }
    }

    /// Await the next event, or `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<GenerationEvent> {
        self.receiver.recv().await
    }

    /// Drain the stream and return the final text.
    ///
    /// Useful for callers that want the terminal content without observing
    /// deltas.
    pub async fn collect_text(mut self) -> Result<String, GenerationError> {
        let mut accumulated = String::new();
        while let Some(event) = self.next().await {
            match event {
                GenerationEvent::Delta { text, .. } => accumulated.push_str(&text),
                GenerationEvent::Completed { text, .. } => return Ok(text),
                GenerationEvent::Failed(err) => return Err(err),
            }
        }
        // Channel closed without a terminal event
        Err(GenerationError::Transport(
            "generation stream ended without completing".to_string(),
        ))
    }
}
