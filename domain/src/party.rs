//! Party and party assistant entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A party: one independent respondent participating in asks.
///
/// Static reference data — loaded once per ask and read-only while the ask
/// runs. `slug` is the stable external identifier ("green", "labour", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: i64,
    pub slug: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub logo_image_url: Option<String>,
    pub manifesto_url: Option<String>,
    /// The assistant used to answer questions for this party.
    pub default_assistant_id: Option<i64>,
}

/// Binding between a party and its remote generation backend.
///
/// `backend_assistant_id` is the backend's own identifier for the assistant
/// that was provisioned with the party's manifesto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAssistant {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub backend_assistant_id: String,
    pub party_id: i64,
}

/// A party together with its resolved default assistant.
///
/// Produced by the registry lookup at the start of an ask. A party without
/// a default assistant cannot answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyWithAssistant {
    pub party: Party,
    pub default_assistant: Option<PartyAssistant>,
}

impl Party {
    /// Display name, falling back to the slug when no name is set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}
