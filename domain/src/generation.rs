//! Streaming events for a single party's generation call.
//!
//! [`GenerationEvent`] represents individual events in one remote streaming
//! text-generation call: zero or more deltas followed by exactly one
//! terminal event ([`Completed`](GenerationEvent::Completed) or
//! [`Failed`](GenerationEvent::Failed)). The sequence is single-pass and
//! finite — consumers drain it to exhaustion or abandon it on cancellation.

use crate::answer::Annotation;
use thiserror::Error;

/// Errors from a single generation stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend sent a chunk with an unexpected content shape.
    ///
    /// The stream fails immediately rather than emitting partial content
    /// silently.
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// The streaming call could not be opened.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The call was opened but the connection broke mid-stream.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// An event in one party's streaming generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// An incremental text chunk, with any citation annotations carried by
    /// that chunk.
    Delta {
        text: String,
        annotations: Vec<Annotation>,
    },
    /// The full final text and annotations (signals stream end).
    Completed {
        text: String,
        annotations: Vec<Annotation>,
    },
    /// The stream failed (signals stream end).
    Failed(GenerationError),
}

impl GenerationEvent {
    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationEvent::Completed { .. } | GenerationEvent::Failed(_)
        )
    }

    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationEvent::Delta { text, .. } | GenerationEvent::Completed { text, .. } => {
                Some(text)
            }
            GenerationEvent::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_not_terminal() {
        let event = GenerationEvent::Delta {
            text: "hello".to_string(),
            annotations: vec![],
        };
        assert!(!event.is_terminal());
        assert_eq!(event.text(), Some("hello"));
    }

    #[test]
    fn completed_is_terminal() {
        let event = GenerationEvent::Completed {
            text: "full answer".to_string(),
            annotations: vec![],
        };
        assert!(event.is_terminal());
        assert_eq!(event.text(), Some("full answer"));
    }

    #[test]
    fn failed_is_terminal_without_text() {
        let event = GenerationEvent::Failed(GenerationError::Transport("gone".to_string()));
        assert!(event.is_terminal());
        assert_eq!(event.text(), None);
    }
}
