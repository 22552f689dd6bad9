//! Ports: interfaces the application layer depends on.
//!
//! Implementations (adapters) live in the infrastructure layer and are
//! injected at startup — no lazy globals.

pub mod generation;
pub mod session;
pub mod store;
