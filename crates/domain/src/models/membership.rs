//! Group membership models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::group::GroupRole;
use super::user::UserSummary;

/// A user's membership in a group. Never hard-deleted; leaving or removal
/// clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMembership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub is_active: bool,
    pub notifications_enabled: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupMembership {
    /// A fresh active membership.
    pub fn new(group_id: Uuid, user_id: Uuid, role: GroupRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            user_id,
            role,
            is_active: true,
            notifications_enabled: true,
            joined_at: now,
            updated_at: now,
        }
    }

    /// Reactivates a previously deactivated membership as a plain member.
    pub fn rejoin(&mut self) {
        let now = Utc::now();
        self.is_active = true;
        self.role = GroupRole::Member;
        self.joined_at = now;
        self.updated_at = now;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Role if the membership is active.
    pub fn active_role(&self) -> Option<GroupRole> {
        self.is_active.then_some(self.role)
    }
}

/// Member listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberResponse {
    pub id: Uuid,
    pub user: UserSummary,
    pub role: GroupRole,
    pub notifications_enabled: bool,
    pub joined_at: DateTime<Utc>,
}

/// Request payload for promoting or demoting a member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ChangeRoleRequest {
    #[validate(length(min = 1, max = 20, message = "Role is required"))]
    pub role: String,
}

/// Request payload for toggling the caller's notification preference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateNotificationsRequest {
    pub notifications_enabled: bool,
}
