//! Invitation repository for read-side queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InvitationWithGroupEntity;
use crate::metrics::QueryTimer;

/// Repository for invitation read operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unanswered invitations addressed to the user, newest first.
    ///
    /// Expired invitations are included; callers flag them.
    pub async fn list_unanswered_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<InvitationWithGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations_for_user");
        let result = sqlx::query_as::<_, InvitationWithGroupEntity>(
            r#"
            SELECT i.id, i.group_id, i.invited_user_id, i.invited_by, i.message,
                   i.is_accepted, i.is_declined, i.expires_at, i.responded_at, i.created_at,
                   g.name AS group_name
            FROM group_invitations i
            JOIN groups g ON g.id = i.group_id
            WHERE i.invited_user_id = $1
              AND i.is_accepted = false
              AND i.is_declined = false
              AND g.is_active = true
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
