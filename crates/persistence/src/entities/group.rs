//! Group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::{GroupPrivacy, GroupType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_privacy that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_privacy", rename_all = "snake_case")]
pub enum GroupPrivacyDb {
    Public,
    ParishOnly,
    Private,
    InviteOnly,
}

impl From<GroupPrivacyDb> for GroupPrivacy {
    fn from(db: GroupPrivacyDb) -> Self {
        match db {
            GroupPrivacyDb::Public => GroupPrivacy::Public,
            GroupPrivacyDb::ParishOnly => GroupPrivacy::ParishOnly,
            GroupPrivacyDb::Private => GroupPrivacy::Private,
            GroupPrivacyDb::InviteOnly => GroupPrivacy::InviteOnly,
        }
    }
}

impl From<GroupPrivacy> for GroupPrivacyDb {
    fn from(privacy: GroupPrivacy) -> Self {
        match privacy {
            GroupPrivacy::Public => GroupPrivacyDb::Public,
            GroupPrivacy::ParishOnly => GroupPrivacyDb::ParishOnly,
            GroupPrivacy::Private => GroupPrivacyDb::Private,
            GroupPrivacy::InviteOnly => GroupPrivacyDb::InviteOnly,
        }
    }
}

/// Database enum for group_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_type", rename_all = "snake_case")]
pub enum GroupTypeDb {
    Ministry,
    Committee,
    Interest,
    AgeBased,
    Study,
    Service,
    Prayer,
    Social,
}

impl From<GroupTypeDb> for GroupType {
    fn from(db: GroupTypeDb) -> Self {
        match db {
            GroupTypeDb::Ministry => GroupType::Ministry,
            GroupTypeDb::Committee => GroupType::Committee,
            GroupTypeDb::Interest => GroupType::Interest,
            GroupTypeDb::AgeBased => GroupType::AgeBased,
            GroupTypeDb::Study => GroupType::Study,
            GroupTypeDb::Service => GroupType::Service,
            GroupTypeDb::Prayer => GroupType::Prayer,
            GroupTypeDb::Social => GroupType::Social,
        }
    }
}

impl From<GroupType> for GroupTypeDb {
    fn from(group_type: GroupType) -> Self {
        match group_type {
            GroupType::Ministry => GroupTypeDb::Ministry,
            GroupType::Committee => GroupTypeDb::Committee,
            GroupType::Interest => GroupTypeDb::Interest,
            GroupType::AgeBased => GroupTypeDb::AgeBased,
            GroupType::Study => GroupTypeDb::Study,
            GroupType::Service => GroupTypeDb::Service,
            GroupType::Prayer => GroupTypeDb::Prayer,
            GroupType::Social => GroupTypeDb::Social,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub parish_id: Uuid,
    pub name: String,
    pub description: String,
    pub group_type: GroupTypeDb,
    pub privacy: GroupPrivacyDb,
    pub created_by: Uuid,
    pub is_active: bool,
    pub is_featured: bool,
    pub allow_member_posts: bool,
    pub require_approval: bool,
    pub max_members: Option<i32>,
    pub member_count: i32,
    pub post_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            parish_id: entity.parish_id,
            name: entity.name,
            description: entity.description,
            group_type: entity.group_type.into(),
            privacy: entity.privacy.into(),
            created_by: entity.created_by,
            is_active: entity.is_active,
            is_featured: entity.is_featured,
            allow_member_posts: entity.allow_member_posts,
            require_approval: entity.require_approval,
            max_members: entity.max_members,
            member_count: entity.member_count,
            post_count: entity.post_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Column list shared by every query that maps into [`GroupEntity`].
pub(crate) const GROUP_COLUMNS: &str = "g.id, g.parish_id, g.name, g.description, g.group_type, \
     g.privacy, g.created_by, g.is_active, g.is_featured, g.allow_member_posts, \
     g.require_approval, g.max_members, g.member_count, g.post_count, g.created_at, g.updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_conversion_both_ways() {
        for privacy in [
            GroupPrivacy::Public,
            GroupPrivacy::ParishOnly,
            GroupPrivacy::Private,
            GroupPrivacy::InviteOnly,
        ] {
            let db: GroupPrivacyDb = privacy.into();
            assert_eq!(GroupPrivacy::from(db), privacy);
        }
    }

    #[test]
    fn test_group_type_conversion() {
        assert_eq!(GroupType::from(GroupTypeDb::AgeBased), GroupType::AgeBased);
        assert_eq!(GroupTypeDb::from(GroupType::Prayer), GroupTypeDb::Prayer);
    }
}
