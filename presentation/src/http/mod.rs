//! HTTP transport
//!
//! Axum routes over the application use cases: the streaming ask endpoint
//! and the question read paths, plus anonymous cookie-session resolution.

mod routes;

pub use routes::{router, AppState};
