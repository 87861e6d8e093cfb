//! Membership repository for read-side queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupMembershipEntity, MemberWithUserEntity};
use crate::metrics::QueryTimer;

/// Repository for membership read operations.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Creates a new MembershipRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the membership row for (group, user), active or not.
    pub async fn find(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, is_active, notifications_enabled, joined_at, updated_at
            FROM group_memberships
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List active members with their user info, admins first.
    pub async fn list_active_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_members");
        let result = sqlx::query_as::<_, MemberWithUserEntity>(
            r#"
            SELECT gm.id, gm.user_id, gm.role, gm.notifications_enabled, gm.joined_at,
                   u.display_name, u.email
            FROM group_memberships gm
            JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1 AND gm.is_active = true
            ORDER BY gm.role ASC, gm.joined_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count active members.
    pub async fn count_active_members(&self, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_active_members");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM group_memberships WHERE group_id = $1 AND is_active = true",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
