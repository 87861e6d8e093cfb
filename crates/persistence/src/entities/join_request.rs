//! Join request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::join_request::{JoinRequestResponse, JoinRequestStatus};
use domain::models::UserSummary;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for join_request_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
pub enum JoinRequestStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<JoinRequestStatusDb> for JoinRequestStatus {
    fn from(db: JoinRequestStatusDb) -> Self {
        match db {
            JoinRequestStatusDb::Pending => JoinRequestStatus::Pending,
            JoinRequestStatusDb::Approved => JoinRequestStatus::Approved,
            JoinRequestStatusDb::Rejected => JoinRequestStatus::Rejected,
        }
    }
}

impl From<JoinRequestStatus> for JoinRequestStatusDb {
    fn from(status: JoinRequestStatus) -> Self {
        match status {
            JoinRequestStatus::Pending => JoinRequestStatusDb::Pending,
            JoinRequestStatus::Approved => JoinRequestStatusDb::Approved,
            JoinRequestStatus::Rejected => JoinRequestStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the group_join_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupJoinRequestEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub message: Option<String>,
    pub status: JoinRequestStatusDb,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GroupJoinRequestEntity> for domain::models::GroupJoinRequest {
    fn from(entity: GroupJoinRequestEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            message: entity.message,
            status: entity.status.into(),
            processed_by: entity.processed_by,
            processed_at: entity.processed_at,
            admin_notes: entity.admin_notes,
            created_at: entity.created_at,
        }
    }
}

/// Join request joined with the requesting user.
#[derive(Debug, Clone, FromRow)]
pub struct JoinRequestWithUserEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: Option<String>,
    pub status: JoinRequestStatusDb,
    pub created_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
}

impl From<JoinRequestWithUserEntity> for JoinRequestResponse {
    fn from(entity: JoinRequestWithUserEntity) -> Self {
        Self {
            id: entity.id,
            user: UserSummary {
                id: entity.user_id,
                display_name: entity.display_name,
                email: entity.email,
            },
            message: entity.message,
            status: entity.status.into(),
            created_at: entity.created_at,
        }
    }
}
