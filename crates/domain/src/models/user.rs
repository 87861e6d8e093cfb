//! User identity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Group roles live on memberships, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub parish_id: Option<Uuid>,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity handed to domain operations on behalf of this user.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            parish_id: self.parish_id,
            is_superuser: self.is_superuser,
        }
    }
}

/// The authenticated caller of a domain operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub parish_id: Option<Uuid>,
    pub is_superuser: bool,
}

impl Actor {
    pub fn new(id: Uuid, parish_id: Option<Uuid>) -> Self {
        Self {
            id,
            parish_id,
            is_superuser: false,
        }
    }

    pub fn superuser(id: Uuid) -> Self {
        Self {
            id,
            parish_id: None,
            is_superuser: true,
        }
    }

    /// Returns true if the actor belongs to the given parish.
    pub fn in_parish(&self, parish_id: Uuid) -> bool {
        self.parish_id == Some(parish_id)
    }
}

/// Minimal user info embedded in member and request listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
}
