//! Row-to-entity mapping shared by the repositories.

use chrono::{DateTime, TimeZone, Utc};
use hustings_application::StoreError;
use hustings_domain::{Annotation, Answer, Party, PartyAssistant, Question};
use rusqlite::Row;

/// Timestamps are stored as integer epoch millis.
pub(crate) fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Annotations are stored as a JSON array, NULL meaning none.
pub(crate) fn annotations_to_json(annotations: &[Annotation]) -> Result<String, StoreError> {
    serde_json::to_string(annotations)
        .map_err(|e| StoreError::Backend(format!("failed to encode annotations: {}", e)))
}

pub(crate) fn annotations_from_json(json: Option<String>) -> Vec<Annotation> {
    json.and_then(|j| serde_json::from_str(&j).ok())
        .unwrap_or_default()
}

/// Columns: id, slug, name, url, logo_image_url, manifesto_url,
/// default_party_assistant_id.
pub(crate) fn party_from_row(row: &Row<'_>) -> rusqlite::Result<Party> {
    Ok(Party {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        logo_image_url: row.get(4)?,
        manifesto_url: row.get(5)?,
        default_assistant_id: row.get(6)?,
    })
}

/// Columns: id, created_at, backend_assistant_id, party_id.
pub(crate) fn assistant_from_row(row: &Row<'_>) -> rusqlite::Result<PartyAssistant> {
    Ok(PartyAssistant {
        id: row.get(0)?,
        created_at: timestamp_from_millis(row.get(1)?),
        backend_assistant_id: row.get(2)?,
        party_id: row.get(3)?,
    })
}

/// Columns: id, slug, created_at, content, user_id, completed.
pub(crate) fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        slug: row.get(1)?,
        created_at: timestamp_from_millis(row.get(2)?),
        content: row.get(3)?,
        user_id: row.get(4)?,
        completed: row.get(5)?,
    })
}

/// Columns: id, created_at, question_id, party_assistant_id, content,
/// annotations, completed, idx.
pub(crate) fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        created_at: timestamp_from_millis(row.get(1)?),
        question_id: row.get(2)?,
        party_assistant_id: row.get(3)?,
        content: row.get(4)?,
        annotations: annotations_from_json(row.get(5)?),
        completed: row.get(6)?,
        index: row.get(7)?,
    })
}
