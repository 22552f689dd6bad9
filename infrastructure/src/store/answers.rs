//! SQLite answer repository.

use crate::store::db::{backend, lock};
use crate::store::rows::{annotations_to_json, answer_from_row, now_millis};
use async_trait::async_trait;
use hustings_application::{AnswerRepository, StoreError};
use hustings_domain::{Annotation, Answer};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteAnswerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAnswerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

const ANSWER_COLUMNS: &str =
    "id, created_at, question_id, party_assistant_id, content, annotations, completed, idx";

fn fetch(conn: &Connection, answer_id: i64) -> Result<Answer, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM answers WHERE id = ?1", ANSWER_COLUMNS),
        params![answer_id],
        answer_from_row,
    )
    .map_err(backend)
}

#[async_trait]
impl AnswerRepository for SqliteAnswerRepository {
    async fn create(
        &self,
        question_id: i64,
        party_assistant_id: i64,
        index: i64,
    ) -> Result<Answer, StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO answers (created_at, question_id, party_assistant_id, content, completed, idx)
             VALUES (?1, ?2, ?3, '', 0, ?4)",
            params![now_millis(), question_id, party_assistant_id, index],
        )
        .map_err(backend)?;
        fetch(&conn, conn.last_insert_rowid())
    }

    async fn complete(
        &self,
        answer_id: i64,
        content: &str,
        annotations: &[Annotation],
    ) -> Result<Answer, StoreError> {
        let conn = lock(&self.conn)?;
        let changed = conn
            .execute(
                "UPDATE answers SET content = ?1, annotations = ?2, completed = 1 WHERE id = ?3",
                params![content, annotations_to_json(annotations)?, answer_id],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::Backend(format!(
                "answer {} does not exist",
                answer_id
            )));
        }
        fetch(&conn, answer_id)
    }

    async fn store_partial(&self, answer_id: i64, content: &str) -> Result<Answer, StoreError> {
        let conn = lock(&self.conn)?;
        let changed = conn
            .execute(
                "UPDATE answers SET content = ?1 WHERE id = ?2",
                params![content, answer_id],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::Backend(format!(
                "answer {} does not exist",
                answer_id
            )));
        }
        fetch(&conn, answer_id)
    }
}
