//! Question browsing use cases.
//!
//! Thin read paths over the question repository: the caller's recent
//! questions and single-question lookup by slug. Answers are always
//! returned sorted by their display index, regardless of arrival order
//! during the original ask.

use crate::ports::store::{QuestionRepository, StoreError};
use hustings_domain::QuestionWithAnswers;
use std::sync::Arc;

/// Bound on the list endpoint: the caller's most recent questions.
pub const RECENT_QUESTIONS_LIMIT: usize = 5;

/// Use case for listing the caller's recent questions.
pub struct ListQuestionsUseCase {
    questions: Arc<dyn QuestionRepository>,
}

impl ListQuestionsUseCase {
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// The caller's most recent visible questions, newest first.
    pub async fn execute(&self, user_id: &str) -> Result<Vec<QuestionWithAnswers>, StoreError> {
        let mut questions = self
            .questions
            .recent_for_user(user_id, RECENT_QUESTIONS_LIMIT)
            .await?;
        for question in &mut questions {
            question.sort_answers();
        }
        Ok(questions)
    }
}

/// Use case for fetching one question by slug, scoped to its owner.
pub struct GetQuestionUseCase {
    questions: Arc<dyn QuestionRepository>,
}

impl GetQuestionUseCase {
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    pub async fn execute(
        &self,
        user_id: &str,
        slug: &str,
    ) -> Result<QuestionWithAnswers, StoreError> {
        let mut question = self.questions.find_by_slug(user_id, slug).await?;
        question.sort_answers();
        Ok(question)
    }
}
