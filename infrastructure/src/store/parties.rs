//! SQLite party registry.

use crate::store::db::{backend, lock};
use crate::store::rows::{assistant_from_row, now_millis, party_from_row};
use async_trait::async_trait;
use hustings_application::{PartyRepository, StoreError};
use hustings_domain::{Party, PartyWithAssistant};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct SqlitePartyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePartyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

const PARTY_COLUMNS: &str =
    "id, slug, name, url, logo_image_url, manifesto_url, default_party_assistant_id";

#[async_trait]
impl PartyRepository for SqlitePartyRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<PartyWithAssistant, StoreError> {
        let conn = lock(&self.conn)?;

        let party = conn
            .query_row(
                &format!("SELECT {} FROM parties WHERE slug = ?1", PARTY_COLUMNS),
                params![slug],
                party_from_row,
            )
            .optional()
            .map_err(backend)?
            .ok_or_else(|| StoreError::PartyNotFound(slug.to_string()))?;

        let default_assistant = match party.default_assistant_id {
            Some(assistant_id) => conn
                .query_row(
                    "SELECT id, created_at, backend_assistant_id, party_id
                     FROM party_assistants WHERE id = ?1",
                    params![assistant_id],
                    assistant_from_row,
                )
                .optional()
                .map_err(backend)?,
            None => None,
        };

        Ok(PartyWithAssistant {
            party,
            default_assistant,
        })
    }

    async fn all_slugs(&self) -> Result<Vec<String>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare("SELECT slug FROM parties ORDER BY id")
            .map_err(backend)?;
        let slugs = stmt
            .query_map([], |row| row.get(0))
            .map_err(backend)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(backend)?;
        Ok(slugs)
    }

    async fn list(&self) -> Result<Vec<Party>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM parties ORDER BY id", PARTY_COLUMNS))
            .map_err(backend)?;
        let parties = stmt
            .query_map([], party_from_row)
            .map_err(backend)?
            .collect::<Result<Vec<Party>, _>>()
            .map_err(backend)?;
        Ok(parties)
    }

    async fn upsert(
        &self,
        slug: &str,
        name: Option<&str>,
        url: Option<&str>,
        logo_image_url: Option<&str>,
        manifesto_url: Option<&str>,
    ) -> Result<Party, StoreError> {
        let conn = lock(&self.conn)?;
        // Fields left unspecified keep their stored value on conflict.
        conn.execute(
            "INSERT INTO parties (slug, name, url, logo_image_url, manifesto_url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(slug) DO UPDATE SET
                 name = COALESCE(excluded.name, parties.name),
                 url = COALESCE(excluded.url, parties.url),
                 logo_image_url = COALESCE(excluded.logo_image_url, parties.logo_image_url),
                 manifesto_url = COALESCE(excluded.manifesto_url, parties.manifesto_url)",
            params![slug, name, url, logo_image_url, manifesto_url],
        )
        .map_err(backend)?;

        conn.query_row(
            &format!("SELECT {} FROM parties WHERE slug = ?1", PARTY_COLUMNS),
            params![slug],
            party_from_row,
        )
        .map_err(backend)
    }

    async fn set_default_assistant(
        &self,
        slug: &str,
        backend_assistant_id: &str,
    ) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;

        let party_id: i64 = conn
            .query_row(
                "SELECT id FROM parties WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?
            .ok_or_else(|| StoreError::PartyNotFound(slug.to_string()))?;

        conn.execute(
            "INSERT INTO party_assistants (created_at, backend_assistant_id, party_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(backend_assistant_id) DO UPDATE SET party_id = excluded.party_id",
            params![now_millis(), backend_assistant_id, party_id],
        )
        .map_err(backend)?;

        let assistant_id: i64 = conn
            .query_row(
                "SELECT id FROM party_assistants WHERE backend_assistant_id = ?1",
                params![backend_assistant_id],
                |row| row.get(0),
            )
            .map_err(backend)?;

        conn.execute(
            "UPDATE parties SET default_party_assistant_id = ?1 WHERE id = ?2",
            params![assistant_id, party_id],
        )
        .map_err(backend)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db::HustingsDb;

    fn repo() -> SqlitePartyRepository {
        let db = HustingsDb::open_in_memory().unwrap();
        SqlitePartyRepository::new(db.connection())
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let repo = repo();
        let err = repo.find_by_slug("snp").await.unwrap_err();
        assert!(matches!(err, StoreError::PartyNotFound(slug) if slug == "snp"));
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let repo = repo();

        let created = repo
            .upsert("green", Some("Green Party"), None, None, None)
            .await
            .unwrap();
        assert_eq!(created.name.as_deref(), Some("Green Party"));

        // Unspecified fields survive a second upsert.
        let updated = repo
            .upsert("green", None, Some("https://green.example"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Green Party"));
        assert_eq!(updated.url.as_deref(), Some("https://green.example"));
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn default_assistant_binding_resolves() {
        let repo = repo();
        repo.upsert("labour", None, None, None, None).await.unwrap();
        repo.set_default_assistant("labour", "asst-labour")
            .await
            .unwrap();

        let resolved = repo.find_by_slug("labour").await.unwrap();
        let assistant = resolved.default_assistant.unwrap();
        assert_eq!(assistant.backend_assistant_id, "asst-labour");
        assert_eq!(resolved.party.default_assistant_id, Some(assistant.id));
    }

    #[tokio::test]
    async fn rebinding_replaces_the_default() {
        let repo = repo();
        repo.upsert("labour", None, None, None, None).await.unwrap();
        repo.set_default_assistant("labour", "asst-v1").await.unwrap();
        repo.set_default_assistant("labour", "asst-v2").await.unwrap();

        let resolved = repo.find_by_slug("labour").await.unwrap();
        assert_eq!(
            resolved.default_assistant.unwrap().backend_assistant_id,
            "asst-v2"
        );
    }

    #[tokio::test]
    async fn all_slugs_in_registration_order() {
        let repo = repo();
        repo.upsert("green", None, None, None, None).await.unwrap();
        repo.upsert("labour", None, None, None, None).await.unwrap();

        assert_eq!(repo.all_slugs().await.unwrap(), vec!["green", "labour"]);
    }
}
