//! Payload types for the assistants streaming API.
//!
//! Covers the slice of the protocol this adapter consumes: the
//! create-thread-and-run request and the `thread.message.delta` /
//! `thread.message.completed` event payloads. Anything with an unexpected
//! content shape is rejected as [`GenerationError::MalformedResponse`]
//! rather than silently skipped.

use hustings_domain::{Annotation, GenerationError};
use serde::{Deserialize, Serialize};

// ==================== Request ====================

/// Body of `POST /v1/threads/runs` with `stream: true`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadAndRunRequest {
    pub assistant_id: String,
    pub stream: bool,
    pub thread: ThreadPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadPayload {
    pub messages: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadMessage {
    pub role: &'static str,
    pub content: String,
}

impl CreateThreadAndRunRequest {
    /// One user message carrying the question, streamed.
    pub fn for_question(assistant_id: &str, question: &str) -> Self {
        Self {
            assistant_id: assistant_id.to_string(),
            stream: true,
            thread: ThreadPayload {
                messages: vec![ThreadMessage {
                    role: "user",
                    content: question.to_string(),
                }],
            },
        }
    }
}

// ==================== Event payloads ====================

/// `thread.message.delta` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaPayload {
    pub delta: MessageDelta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    #[serde(default)]
    pub content: Vec<DeltaContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<DeltaText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaText {
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Vec<ApiAnnotation>,
}

/// `thread.message.completed` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCompletedPayload {
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<MessageText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<ApiAnnotation>,
}

/// Citation annotation as the API emits it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAnnotation {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub start_index: u32,
    #[serde(default)]
    pub end_index: u32,
    pub file_citation: Option<FileCitation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileCitation {
    pub file_id: Option<String>,
}

impl ApiAnnotation {
    pub fn into_domain(self) -> Annotation {
        Annotation {
            text: self.text.unwrap_or_default(),
            start_index: self.start_index,
            end_index: self.end_index,
            file_id: self.file_citation.and_then(|c| c.file_id),
        }
    }
}

// ==================== Parsing ====================

/// Parse one `thread.message.delta` data payload into (text, annotations).
pub fn parse_delta(data: &str) -> Result<(String, Vec<Annotation>), GenerationError> {
    let payload: MessageDeltaPayload = serde_json::from_str(data)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid delta payload: {}", e)))?;

    let Some(content) = payload.delta.content.into_iter().next() else {
        return Err(GenerationError::MalformedResponse(
            "delta payload carried no content".to_string(),
        ));
    };

    let text = match (content.kind.as_str(), content.text) {
        ("text", Some(text)) => text,
        (kind, _) => {
            return Err(GenerationError::MalformedResponse(format!(
                "unknown content text type '{}' or invalid value",
                kind
            )));
        }
    };
    let Some(value) = text.value else {
        return Err(GenerationError::MalformedResponse(
            "delta text carried no value".to_string(),
        ));
    };

    let annotations = text
        .annotations
        .into_iter()
        .map(ApiAnnotation::into_domain)
        .collect();
    Ok((value, annotations))
}

/// Parse one `thread.message.completed` data payload into the final
/// (text, annotations).
pub fn parse_completed(data: &str) -> Result<(String, Vec<Annotation>), GenerationError> {
    let payload: MessageCompletedPayload = serde_json::from_str(data).map_err(|e| {
        GenerationError::MalformedResponse(format!("invalid completed payload: {}", e))
    })?;

    let Some(content) = payload.content.into_iter().next() else {
        return Err(GenerationError::MalformedResponse(
            "completed message carried no content".to_string(),
        ));
    };

    match (content.kind.as_str(), content.text) {
        ("text", Some(text)) => {
            let annotations = text
                .annotations
                .into_iter()
                .map(ApiAnnotation::into_domain)
                .collect();
            Ok((text.value, annotations))
        }
        (kind, _) => Err(GenerationError::MalformedResponse(format!(
            "unknown content text type '{}' or invalid value",
            kind
        ))),
    }
}
