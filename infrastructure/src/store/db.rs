//! Database handle and schema migrations.

use hustings_application::StoreError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Shared SQLite handle for all repositories.
pub struct HustingsDb {
    conn: Arc<Mutex<Connection>>,
}

impl HustingsDb {
    /// Open or create the database at the given path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StoreError::Backend(format!("failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    /// In-memory database (tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Backend(format!("failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Shared connection handle for the repositories.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )
        .map_err(backend)?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map_err(backend)?;
            info!("Database migrated to schema v{}", SCHEMA_VERSION);
        }

        Ok(())
    }
}

fn migrate_v1(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS parties (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            name TEXT,
            url TEXT,
            logo_image_url TEXT,
            manifesto_url TEXT,
            default_party_assistant_id INTEGER REFERENCES party_assistants(id)
        );

        CREATE TABLE IF NOT EXISTS party_assistants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at INTEGER NOT NULL,
            backend_assistant_id TEXT NOT NULL UNIQUE,
            party_id INTEGER NOT NULL REFERENCES parties(id)
        );

        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            content TEXT NOT NULL,
            user_id TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at INTEGER NOT NULL,
            question_id INTEGER NOT NULL REFERENCES questions(id),
            party_assistant_id INTEGER NOT NULL REFERENCES party_assistants(id),
            content TEXT NOT NULL DEFAULT '',
            annotations TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            idx INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_questions_user ON questions(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id);
        "#,
    )
    .map_err(backend)
}

/// Lock the shared connection, mapping poisoning to a backend error.
pub(crate) fn lock(
    conn: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock()
        .map_err(|e| StoreError::Backend(format!("connection lock poisoned: {}", e)))
}

/// Map any rusqlite error to a backend store error.
pub(crate) fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
