//! Caller identity types.
//!
//! Session lookup itself is an external capability (a port implemented in
//! the infrastructure layer); the domain only carries the resolved shapes.

use serde::{Deserialize, Serialize};

/// A user known to the system. Anonymous users have no name or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Create an anonymous user with the given id.
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            email: None,
        }
    }
}

/// An authenticated (possibly anonymous) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token, also used as the cookie value.
    pub token: String,
    pub user: User,
}
