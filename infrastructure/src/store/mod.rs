//! SQLite persistence.
//!
//! One database file holds the four related tables (parties,
//! party_assistants, questions, answers) plus anonymous sessions. Row
//! mutation during an ask is single-writer (the orchestrator task), so the
//! repositories rely on SQLite's own transactional guarantees for
//! individual statements and take no row-level locks of their own.

pub mod answers;
pub mod db;
pub mod parties;
pub mod questions;
mod rows;
pub mod sessions;
mod slug;

pub use answers::SqliteAnswerRepository;
pub use db::HustingsDb;
pub use parties::SqlitePartyRepository;
pub use questions::SqliteQuestionRepository;
pub use sessions::SqliteSessionGateway;
