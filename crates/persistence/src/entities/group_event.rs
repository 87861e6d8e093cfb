//! Group event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_events table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEventEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_all_day: bool,
    pub max_attendees: Option<i32>,
    pub require_rsvp: bool,
    pub is_public: bool,
    pub attendee_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEventEntity> for domain::models::GroupEvent {
    fn from(entity: GroupEventEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            created_by: entity.created_by,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            start_at: entity.start_at,
            end_at: entity.end_at,
            is_all_day: entity.is_all_day,
            max_attendees: entity.max_attendees,
            require_rsvp: entity.require_rsvp,
            is_public: entity.is_public,
            attendee_count: entity.attendee_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
