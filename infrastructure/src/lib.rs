//! Infrastructure layer for hustings
//!
//! Adapters behind the application layer's ports:
//!
//! - [`openai`] — streaming generation gateway over the OpenAI assistants
//!   API (reqwest + server-sent events).
//! - [`store`] — SQLite persistence for parties, assistants, questions,
//!   answers and anonymous sessions (rusqlite).
//! - [`config`] — figment-based configuration loading.

pub mod config;
pub mod openai;
pub mod store;

pub use config::{ConfigLoader, FileConfig};
pub use openai::OpenAiGenerationGateway;
pub use store::{
    HustingsDb, SqliteAnswerRepository, SqlitePartyRepository, SqliteQuestionRepository,
    SqliteSessionGateway,
};
