//! Session gateway port
//!
//! Caller-identity resolution. Entirely outside the core ask path: routes
//! resolve a session before invoking any use case, so `SessionNotFound`
//! never reaches the orchestrator.

use async_trait::async_trait;
use hustings_domain::Session;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Resolves bearer tokens to sessions and mints anonymous ones.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Look up a session by token. `Ok(None)` for unknown or absent tokens.
    async fn find(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Create a fresh anonymous session.
    async fn create_anonymous(&self) -> Result<Session, SessionError>;

    /// Resolve the given token or fall back to a new anonymous session.
    ///
    /// Returns the session and whether it was newly created (so the
    /// transport knows to set the cookie).
    async fn find_or_create(&self, token: Option<&str>) -> Result<(Session, bool), SessionError> {
        if let Some(token) = token {
            if let Some(session) = self.find(token).await? {
                return Ok((session, false));
            }
        }
        Ok((self.create_anonymous().await?, true))
    }
}
