//! Use cases

pub mod ask;
pub mod list_questions;
pub mod merge;
