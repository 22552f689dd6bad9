//! Persistent store ports
//!
//! Repositories over the four related tables: parties, party assistants,
//! questions and answers. Implementations live in the infrastructure layer.

use async_trait::async_trait;
use hustings_domain::{Annotation, Answer, Party, PartyWithAssistant, Question, QuestionWithAnswers};
use thiserror::Error;

/// Errors from store operations.
///
/// A write failure anywhere during an ask aborts the whole ask — once a
/// persistence call fails, question/answer state is unreliable.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Party not found for slug '{0}'")]
    PartyNotFound(String),

    #[error("Question not found: {0}")]
    QuestionNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Registry of parties and their backend assistant bindings.
#[async_trait]
pub trait PartyRepository: Send + Sync {
    /// Resolve a slug to the party and its default assistant.
    ///
    /// Returns [`StoreError::PartyNotFound`] for unknown slugs.
    async fn find_by_slug(&self, slug: &str) -> Result<PartyWithAssistant, StoreError>;

    /// Slugs of every registered party, in registration order.
    async fn all_slugs(&self) -> Result<Vec<String>, StoreError>;

    /// All registered parties.
    async fn list(&self) -> Result<Vec<Party>, StoreError>;

    /// Insert or update a party by slug.
    async fn upsert(
        &self,
        slug: &str,
        name: Option<&str>,
        url: Option<&str>,
        logo_image_url: Option<&str>,
        manifesto_url: Option<&str>,
    ) -> Result<Party, StoreError>;

    /// Bind a backend assistant to a party and make it the default.
    async fn set_default_assistant(
        &self,
        slug: &str,
        backend_assistant_id: &str,
    ) -> Result<(), StoreError>;
}

/// Question persistence.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Create a question row with a fresh unguessable slug.
    async fn create(&self, user_id: &str, content: &str) -> Result<Question, StoreError>;

    /// Flip `completed` to true and return the updated row.
    async fn mark_completed(&self, question_id: i64) -> Result<Question, StoreError>;

    /// The user's most recent questions, newest first, capped at `limit`.
    ///
    /// Only questions with at least one answer are visible. Answer order
    /// within each question is unspecified here; callers sort by index.
    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<QuestionWithAnswers>, StoreError>;

    /// Fetch one visible question by slug, scoped to its owner.
    async fn find_by_slug(
        &self,
        user_id: &str,
        slug: &str,
    ) -> Result<QuestionWithAnswers, StoreError>;
}

/// Answer persistence.
///
/// Rows are created on `answer.started` and written again only at terminal
/// transitions; delta content is accumulated in memory by the orchestrator
/// and is not durably checkpointed per-chunk.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert an empty answer row for a newly started stream.
    async fn create(
        &self,
        question_id: i64,
        party_assistant_id: i64,
        index: i64,
    ) -> Result<Answer, StoreError>;

    /// Persist final content and annotations, setting `completed = true`.
    async fn complete(
        &self,
        answer_id: i64,
        content: &str,
        annotations: &[Annotation],
    ) -> Result<Answer, StoreError>;

    /// Persist whatever content accumulated before a failure.
    ///
    /// `completed` stays false; the partial text is retained.
    async fn store_partial(&self, answer_id: i64, content: &str) -> Result<Answer, StoreError>;
}
