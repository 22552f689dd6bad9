//! Answer entity and citation annotations

use crate::party::Party;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A citation marker attached to answer text.
///
/// Produced by the generation backend when the assistant quotes its source
/// document (the party manifesto). `start_index`/`end_index` are character
/// offsets into the answer content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub start_index: u32,
    pub end_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

/// One party's answer to a question.
///
/// Created when the party's generation stream starts; mutated only by the
/// owning orchestrator task as that stream's events arrive. `completed` is
/// set exactly once. `index` is the party's position in the (shuffled)
/// respondent ordering for the ask — fixed at creation and used purely for
/// stable client-side ordering, not delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub question_id: i64,
    pub party_assistant_id: i64,
    pub content: String,
    pub annotations: Vec<Annotation>,
    pub completed: bool,
    pub index: i64,
}

/// An answer joined with the party that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerWithParty {
    pub answer: Answer,
    pub party: Party,
}
