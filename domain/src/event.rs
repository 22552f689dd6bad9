//! The merged event stream of an ask.
//!
//! [`AskEvent`] is the tagged union handed to the transport layer, one
//! event at a time, while an ask runs. Events are transient — they are
//! derived from and reflected into question/answer state, never persisted
//! as a log.
//!
//! # Ordering
//!
//! - Exactly one [`QuestionCreated`](AskEvent::QuestionCreated) precedes
//!   all answer events.
//! - Per party: one [`AnswerStarted`](AskEvent::AnswerStarted), zero or
//!   more [`AnswerDelta`](AskEvent::AnswerDelta), then exactly one terminal
//!   [`AnswerCompleted`](AskEvent::AnswerCompleted) or
//!   [`AnswerFailed`](AskEvent::AnswerFailed). Events from different
//!   parties interleave in arrival order.
//! - Exactly one [`QuestionCompleted`](AskEvent::QuestionCompleted) follows
//!   the last terminal answer event.

use crate::answer::{Annotation, AnswerWithParty};
use crate::question::Question;

/// One event in an ask's merged stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AskEvent {
    /// The question row exists; answering is about to begin.
    QuestionCreated { question: Question },

    /// A party's generation stream opened and its answer row was created.
    AnswerStarted { answer: AnswerWithParty },

    /// An incremental chunk of one answer's text.
    AnswerDelta {
        answer_id: i64,
        delta: String,
        annotations: Vec<Annotation>,
    },

    /// One answer finished; final content and annotations are persisted.
    AnswerCompleted { answer: AnswerWithParty },

    /// One answer failed mid-flight. Accumulated content is kept and the
    /// answer stays `completed = false`; sibling answers are unaffected.
    AnswerFailed {
        /// Missing when the stream failed before the answer row was created.
        answer_id: Option<i64>,
        party_slug: String,
        error: String,
    },

    /// Every answer reached a terminal state and the question is marked
    /// completed. Carries the full answer set, sorted by index.
    QuestionCompleted {
        question: Question,
        answers: Vec<AnswerWithParty>,
    },
}

impl AskEvent {
    /// Short event name, matching the wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AskEvent::QuestionCreated { .. } => "question.created",
            AskEvent::AnswerStarted { .. } => "answer.started",
            AskEvent::AnswerDelta { .. } => "answer.delta",
            AskEvent::AnswerCompleted { .. } => "answer.completed",
            AskEvent::AnswerFailed { .. } => "answer.failed",
            AskEvent::QuestionCompleted { .. } => "question.completed",
        }
    }

    /// Returns true for the per-answer terminal events.
    pub fn is_answer_terminal(&self) -> bool {
        matches!(
            self,
            AskEvent::AnswerCompleted { .. } | AskEvent::AnswerFailed { .. }
        )
    }
}
