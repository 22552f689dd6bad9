//! Wire serialization for questions, answers and ask events.
//!
//! The JSON shapes here are the client contract: camelCase keys, epoch
//! millisecond timestamps, annotations defaulted to `[]`. Ask events are
//! tagged unions discriminated by a dotted `type` field and written as
//! newline-delimited JSON by the HTTP layer.

use hustings_domain::{Annotation, AnswerWithParty, AskEvent, Party, Question, QuestionWithAnswers};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParty {
    pub slug: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub logo_image_url: Option<String>,
    pub manifesto_url: Option<String>,
}

impl From<&Party> for WireParty {
    fn from(party: &Party) -> Self {
        Self {
            slug: party.slug.clone(),
            name: party.name.clone(),
            url: party.url.clone(),
            logo_image_url: party.logo_image_url.clone(),
            manifesto_url: party.manifesto_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAnswer {
    pub id: i64,
    pub created_at: i64,
    pub content: String,
    pub annotations: Vec<Annotation>,
    pub party: WireParty,
    pub completed: bool,
    pub index: i64,
}

impl From<&AnswerWithParty> for WireAnswer {
    fn from(answer: &AnswerWithParty) -> Self {
        Self {
            id: answer.answer.id,
            created_at: answer.answer.created_at.timestamp_millis(),
            content: answer.answer.content.clone(),
            annotations: answer.answer.annotations.clone(),
            party: WireParty::from(&answer.party),
            completed: answer.answer.completed,
            index: answer.answer.index,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQuestion {
    pub slug: String,
    pub created_at: i64,
    pub content: String,
    pub answers: Vec<WireAnswer>,
}

impl WireQuestion {
    fn new(question: &Question, answers: &[AnswerWithParty]) -> Self {
        Self {
            slug: question.slug.clone(),
            created_at: question.created_at.timestamp_millis(),
            content: question.content.clone(),
            answers: answers.iter().map(WireAnswer::from).collect(),
        }
    }
}

impl From<&QuestionWithAnswers> for WireQuestion {
    fn from(question: &QuestionWithAnswers) -> Self {
        Self::new(&question.question, &question.answers)
    }
}

/// One serialized ask event, discriminated by a dotted `type` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WireEvent {
    #[serde(rename = "question.created")]
    QuestionCreated { question: WireQuestion },

    #[serde(rename = "answer.started")]
    AnswerStarted { answer: WireAnswer },

    #[serde(rename = "answer.delta")]
    #[serde(rename_all = "camelCase")]
    AnswerDelta {
        answer_id: i64,
        delta: String,
        annotations: Vec<Annotation>,
    },

    #[serde(rename = "answer.completed")]
    AnswerCompleted { answer: WireAnswer },

    #[serde(rename = "answer.failed")]
    #[serde(rename_all = "camelCase")]
    AnswerFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        answer_id: Option<i64>,
        party: String,
        error: String,
    },

    #[serde(rename = "question.completed")]
    QuestionCompleted { question: WireQuestion },
}

impl From<&AskEvent> for WireEvent {
    fn from(event: &AskEvent) -> Self {
        match event {
            AskEvent::QuestionCreated { question } => WireEvent::QuestionCreated {
                question: WireQuestion::new(question, &[]),
            },
            AskEvent::AnswerStarted { answer } => WireEvent::AnswerStarted {
                answer: WireAnswer::from(answer),
            },
            AskEvent::AnswerDelta {
                answer_id,
                delta,
                annotations,
            } => WireEvent::AnswerDelta {
                answer_id: *answer_id,
                delta: delta.clone(),
                annotations: annotations.clone(),
            },
            AskEvent::AnswerCompleted { answer } => WireEvent::AnswerCompleted {
                answer: WireAnswer::from(answer),
            },
            AskEvent::AnswerFailed {
                answer_id,
                party_slug,
                error,
            } => WireEvent::AnswerFailed {
                answer_id: *answer_id,
                party: party_slug.clone(),
                error: error.clone(),
            },
            AskEvent::QuestionCompleted { question, answers } => WireEvent::QuestionCompleted {
                question: WireQuestion::new(question, answers),
            },
        }
    }
}

/// Serialize one ask event as a single NDJSON line (newline included).
pub fn event_line(event: &AskEvent) -> String {
    let wire = WireEvent::from(event);
    // WireEvent holds only plain serializable data.
    let mut line = serde_json::to_string(&wire).unwrap_or_else(|_| "{}".to_string());
    line.push('\n');
    line
}
