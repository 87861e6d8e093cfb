//! Group membership entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::GroupRole;
use domain::models::membership::MemberResponse;
use domain::models::UserSummary;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Admin,
    Moderator,
    Member,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Admin => GroupRole::Admin,
            GroupRoleDb::Moderator => GroupRole::Moderator,
            GroupRoleDb::Member => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Admin => GroupRoleDb::Admin,
            GroupRole::Moderator => GroupRoleDb::Moderator,
            GroupRole::Member => GroupRoleDb::Member,
        }
    }
}

/// Database row mapping for the group_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub is_active: bool,
    pub notifications_enabled: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for domain::models::GroupMembership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            is_active: entity.is_active,
            notifications_enabled: entity.notifications_enabled,
            joined_at: entity.joined_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Member entity with user info for listing members.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUserEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub notifications_enabled: bool,
    pub joined_at: DateTime<Utc>,
    // User fields
    pub display_name: String,
    pub email: String,
}

impl From<MemberWithUserEntity> for MemberResponse {
    fn from(entity: MemberWithUserEntity) -> Self {
        Self {
            id: entity.id,
            user: UserSummary {
                id: entity.user_id,
                display_name: entity.display_name,
                email: entity.email,
            },
            role: entity.role.into(),
            notifications_enabled: entity.notifications_enabled,
            joined_at: entity.joined_at,
        }
    }
}
