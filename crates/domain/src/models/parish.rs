//! Parish directory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A diocese groups parishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Diocese {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A parish within a diocese. Users and groups belong to exactly one parish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Parish {
    pub id: Uuid,
    pub diocese_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
