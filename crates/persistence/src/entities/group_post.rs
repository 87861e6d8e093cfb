//! Group post entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group_post::GroupPostResponse;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_posts table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupPostEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub author_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub is_announcement: bool,
    pub is_pinned: bool,
    pub is_approved: bool,
    pub is_deleted: bool,
    pub likes_count: i32,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupPostEntity> for domain::models::GroupPost {
    fn from(entity: GroupPostEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            author_id: entity.author_id,
            title: entity.title,
            content: entity.content,
            is_announcement: entity.is_announcement,
            is_pinned: entity.is_pinned,
            is_approved: entity.is_approved,
            is_deleted: entity.is_deleted,
            likes_count: entity.likes_count,
            published_at: entity.published_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Post with author name and whether the viewer liked it.
#[derive(Debug, Clone, FromRow)]
pub struct GroupPostWithAuthorEntity {
    #[sqlx(flatten)]
    pub post: GroupPostEntity,
    pub author_name: String,
    pub liked_by_you: bool,
}

impl From<GroupPostWithAuthorEntity> for GroupPostResponse {
    fn from(entity: GroupPostWithAuthorEntity) -> Self {
        Self {
            post: entity.post.into(),
            author_name: entity.author_name,
            liked_by_you: entity.liked_by_you,
        }
    }
}
