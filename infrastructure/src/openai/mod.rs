//! OpenAI assistants streaming adapter.
//!
//! Implements the [`GenerationGateway`] port over the assistants API's
//! create-thread-and-run streaming call:
//!
//! - [`protocol`] — request/response payload types and payload parsing.
//! - [`transport`] — incremental server-sent-events framing.
//! - [`gateway`] — the HTTP client and per-call read-loop task.
//!
//! [`GenerationGateway`]: hustings_application::GenerationGateway

pub mod gateway;
pub mod protocol;
pub mod transport;

pub use gateway::OpenAiGenerationGateway;
