//! Join request repository for read-side queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::JoinRequestWithUserEntity;
use crate::metrics::QueryTimer;

/// Repository for join request read operations.
#[derive(Clone)]
pub struct JoinRequestRepository {
    pool: PgPool,
}

impl JoinRequestRepository {
    /// Creates a new JoinRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pending requests for a group, oldest first.
    pub async fn list_pending(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<JoinRequestWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_join_requests");
        let result = sqlx::query_as::<_, JoinRequestWithUserEntity>(
            r#"
            SELECT r.id, r.user_id, r.message, r.status, r.created_at,
                   u.display_name, u.email
            FROM group_join_requests r
            JOIN users u ON u.id = r.user_id
            WHERE r.group_id = $1 AND r.status = 'pending'
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
