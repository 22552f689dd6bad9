//! Presentation layer for hustings
//!
//! The outward-facing surfaces:
//!
//! - [`http`] — axum routes (streaming ask endpoint, question read paths,
//!   cookie sessions).
//! - [`wire`] — the JSON shapes and NDJSON event lines the client sees.
//! - [`cli`] — clap argument types for the `hustings` binary.

pub mod cli;
pub mod http;
pub mod wire;

pub use cli::{Cli, Command, PartyCommand};
pub use http::{router, AppState};
pub use wire::{event_line, WireAnswer, WireEvent, WireParty, WireQuestion};
