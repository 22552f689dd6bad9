//! Application layer for hustings
//!
//! Ports (traits the infrastructure layer implements) and use cases.
//!
//! The two pieces of real coordination engineering live here:
//!
//! - [`use_cases::merge::StreamMerger`] — the K-way fan-out/fan-in funnel
//!   that interleaves per-party generation streams in arrival order.
//! - [`use_cases::ask::AskQuestionUseCase`] — the per-ask state machine
//!   that creates the question, drives the merger, persists answer
//!   lifecycle transitions and emits the [`AskEvent`] protocol.
//!
//! [`AskEvent`]: hustings_domain::AskEvent

pub mod ports;
pub mod use_cases;

pub use ports::generation::{AnswerStream, GenerationGateway};
pub use ports::session::{SessionError, SessionGateway};
pub use ports::store::{
    AnswerRepository, PartyRepository, QuestionRepository, StoreError,
};
pub use use_cases::ask::{AskError, AskQuestionUseCase, AskStream};
pub use use_cases::list_questions::{GetQuestionUseCase, ListQuestionsUseCase, RECENT_QUESTIONS_LIMIT};
pub use use_cases::merge::{JobEvent, MergeJob, MergedEvent, MergedStream, StreamMerger};
