//! Domain layer for hustings
//!
//! This crate contains the core entities and the event model for an ask.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ask
//!
//! An ask is one end-to-end question lifecycle: a user's question is put to
//! every registered party at once, each party's assistant streams an answer
//! back, and the whole exchange is observable as a single merged
//! [`AskEvent`] sequence.
//!
//! ## Party / Assistant
//!
//! A **party** is one independent respondent (e.g. a political party whose
//! manifesto backs its answers). Each party is bound to a **party
//! assistant**, the handle of the remote generation backend that produces
//! its answers.

pub mod answer;
pub mod event;
pub mod generation;
pub mod identity;
pub mod party;
pub mod question;

// Re-export commonly used types
pub use answer::{Annotation, Answer, AnswerWithParty};
pub use event::AskEvent;
pub use generation::{GenerationError, GenerationEvent};
pub use identity::{Session, User};
pub use party::{Party, PartyAssistant, PartyWithAssistant};
pub use question::{Question, QuestionWithAnswers};
