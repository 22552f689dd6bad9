//! Question entity

use crate::answer::AnswerWithParty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question put to the full party set.
///
/// Created once at the start of an ask. `completed` flips exactly once,
/// after every answer has reached a terminal state. `slug` is a
/// client-stable, unguessable identifier used in URLs instead of the row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: String,
    pub completed: bool,
}

/// A question with its answers, as returned by list/get queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<AnswerWithParty>,
}

impl QuestionWithAnswers {
    /// Sort answers into their stable display order.
    ///
    /// Answers are created in arrival order during an ask; clients always
    /// see them ordered by the index assigned at creation.
    pub fn sort_answers(&mut self) {
        self.answers.sort_by_key(|a| a.answer.index);
    }
}
