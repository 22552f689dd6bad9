//! SQLite anonymous session store.
//!
//! Minimal find-or-create identity: an unknown or absent token mints an
//! anonymous user and a fresh bearer token. Tokens live in the same
//! database as the rest of the state.

use crate::store::db::lock;
use crate::store::rows::now_millis;
use crate::store::slug;
use async_trait::async_trait;
use hustings_application::{SessionError, SessionGateway};
use hustings_domain::{Session, User};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SqliteSessionGateway {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionGateway {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionGateway for SqliteSessionGateway {
    async fn find(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let conn = lock(&self.conn).map_err(|e| SessionError::Backend(e.to_string()))?;
        let user_id: Option<String> = conn
            .query_row(
                "SELECT user_id FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SessionError::Backend(e.to_string()))?;

        Ok(user_id.map(|id| Session {
            token: token.to_string(),
            user: User::anonymous(id),
        }))
    }

    async fn create_anonymous(&self) -> Result<Session, SessionError> {
        let conn = lock(&self.conn).map_err(|e| SessionError::Backend(e.to_string()))?;
        let token = slug::session_token();
        let user_id = format!("anon-{}", slug::nanoid(21));
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, now_millis()],
        )
        .map_err(|e| SessionError::Backend(e.to_string()))?;

        Ok(Session {
            token,
            user: User::anonymous(user_id),
        })
    }
}
