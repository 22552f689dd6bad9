//! SQLite question repository.

use crate::store::db::{backend, lock};
use crate::store::rows::{answer_from_row, now_millis, question_from_row};
use crate::store::slug;
use async_trait::async_trait;
use hustings_application::{QuestionRepository, StoreError};
use hustings_domain::{AnswerWithParty, Party, Question, QuestionWithAnswers};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SqliteQuestionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteQuestionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

const QUESTION_COLUMNS: &str = "id, slug, created_at, content, user_id, completed";

/// Answer columns joined with the owning party's columns.
const ANSWER_JOIN: &str = "SELECT a.id, a.created_at, a.question_id, a.party_assistant_id,
        a.content, a.annotations, a.completed, a.idx,
        p.id, p.slug, p.name, p.url, p.logo_image_url, p.manifesto_url,
        p.default_party_assistant_id
     FROM answers a
     JOIN party_assistants pa ON a.party_assistant_id = pa.id
     JOIN parties p ON pa.party_id = p.id
     WHERE a.question_id = ?1";

fn answers_for_question(
    conn: &Connection,
    question_id: i64,
) -> Result<Vec<AnswerWithParty>, StoreError> {
    let mut stmt = conn.prepare(ANSWER_JOIN).map_err(backend)?;
    let answers = stmt
        .query_map(params![question_id], |row| {
            let answer = answer_from_row(row)?;
            // Party columns start after the eight answer columns.
            let party = Party {
                id: row.get(8)?,
                slug: row.get(9)?,
                name: row.get(10)?,
                url: row.get(11)?,
                logo_image_url: row.get(12)?,
                manifesto_url: row.get(13)?,
                default_assistant_id: row.get(14)?,
            };
            Ok(AnswerWithParty { answer, party })
        })
        .map_err(backend)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(backend)?;
    Ok(answers)
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn create(&self, user_id: &str, content: &str) -> Result<Question, StoreError> {
        let conn = lock(&self.conn)?;
        let slug = slug::question_slug();
        conn.execute(
            "INSERT INTO questions (slug, created_at, content, user_id, completed)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![slug, now_millis(), content, user_id],
        )
        .map_err(backend)?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
            params![id],
            question_from_row,
        )
        .map_err(backend)
    }

    async fn mark_completed(&self, question_id: i64) -> Result<Question, StoreError> {
        let conn = lock(&self.conn)?;
        let changed = conn
            .execute(
                "UPDATE questions SET completed = 1 WHERE id = ?1",
                params![question_id],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::QuestionNotFound(question_id.to_string()));
        }
        conn.query_row(
            &format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS),
            params![question_id],
            question_from_row,
        )
        .map_err(backend)
    }

    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<QuestionWithAnswers>, StoreError> {
        let conn = lock(&self.conn)?;

        // Only questions with at least one answer are visible.
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM questions q
                 WHERE user_id = ?1
                   AND EXISTS (SELECT 1 FROM answers a WHERE a.question_id = q.id)
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
                QUESTION_COLUMNS
            ))
            .map_err(backend)?;
        let questions = stmt
            .query_map(params![user_id, limit as i64], question_from_row)
            .map_err(backend)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend)?;

        let mut result = Vec::with_capacity(questions.len());
        for question in questions {
            let answers = answers_for_question(&conn, question.id)?;
            result.push(QuestionWithAnswers { question, answers });
        }
        Ok(result)
    }

    async fn find_by_slug(
        &self,
        user_id: &str,
        slug: &str,
    ) -> Result<QuestionWithAnswers, StoreError> {
        let conn = lock(&self.conn)?;

        let question = conn
            .query_row(
                &format!(
                    "SELECT {} FROM questions WHERE slug = ?1 AND user_id = ?2",
                    QUESTION_COLUMNS
                ),
                params![slug, user_id],
                question_from_row,
            )
            .optional()
            .map_err(backend)?
            .ok_or_else(|| StoreError::QuestionNotFound(slug.to_string()))?;

        let answers = answers_for_question(&conn, question.id)?;
        if answers.is_empty() {
            // Answerless questions are not visible.
            return Err(StoreError::QuestionNotFound(slug.to_string()));
        }
        Ok(QuestionWithAnswers { question, answers })
    }
}
