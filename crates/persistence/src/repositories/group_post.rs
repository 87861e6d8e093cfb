//! Group post repository for read-side queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GroupPostWithAuthorEntity;
use crate::metrics::QueryTimer;

/// Repository for group post read operations.
#[derive(Clone)]
pub struct GroupPostRepository {
    pool: PgPool,
}

impl GroupPostRepository {
    /// Creates a new GroupPostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Approved, non-deleted posts, pinned first then newest.
    pub async fn list_visible(
        &self,
        group_id: Uuid,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupPostWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_visible_group_posts");
        let result = sqlx::query_as::<_, GroupPostWithAuthorEntity>(
            r#"
            SELECT p.id, p.group_id, p.author_id, p.title, p.content, p.is_announcement,
                   p.is_pinned, p.is_approved, p.is_deleted, p.likes_count, p.published_at,
                   p.updated_at,
                   u.display_name AS author_name,
                   EXISTS (
                       SELECT 1 FROM reactions r
                       WHERE r.target_kind = 'group_post' AND r.target_id = p.id
                         AND r.user_id = $2
                   ) AS liked_by_you
            FROM group_posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.group_id = $1 AND p.is_approved = true AND p.is_deleted = false
            ORDER BY p.is_pinned DESC, p.published_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(group_id)
        .bind(viewer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count approved, non-deleted posts.
    pub async fn count_visible(&self, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_visible_group_posts");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM group_posts
            WHERE group_id = $1 AND is_approved = true AND is_deleted = false
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
