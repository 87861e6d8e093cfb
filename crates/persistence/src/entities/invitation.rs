//! Group invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupInvitationEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub invited_user_id: Uuid,
    pub invited_by: Uuid,
    pub message: Option<String>,
    pub is_accepted: bool,
    pub is_declined: bool,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupInvitationEntity> for domain::models::GroupInvitation {
    fn from(entity: GroupInvitationEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            invited_user_id: entity.invited_user_id,
            invited_by: entity.invited_by,
            message: entity.message,
            is_accepted: entity.is_accepted,
            is_declined: entity.is_declined,
            expires_at: entity.expires_at,
            responded_at: entity.responded_at,
            created_at: entity.created_at,
        }
    }
}

/// Invitation with the name of the group it is for.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationWithGroupEntity {
    #[sqlx(flatten)]
    pub invitation: GroupInvitationEntity,
    pub group_name: String,
}
