//! Group post models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A post published inside a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupPost {
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

impl GroupPost {
    pub fn new(group_id: Uuid, author_id: Uuid, request: CreateGroupPostRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            author_id,
            title: request.title,
            content: request.content,
            is_announcement: request.is_announcement.unwrap_or(false),
            is_pinned: false,
            is_approved: true,
            is_deleted: false,
            likes_count: 0,
            published_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the post counts toward the group's post_count.
    pub fn is_visible(&self) -> bool {
        self.is_approved && !self.is_deleted
    }
}

/// Moderation actions on a group post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostModeration {
    Pin,
    Unpin,
    Approve,
    Unapprove,
    Announce,
}

impl PostModeration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostModeration::Pin => "pin",
            PostModeration::Unpin => "unpin",
            PostModeration::Approve => "approve",
            PostModeration::Unapprove => "unapprove",
            PostModeration::Announce => "announce",
        }
    }

    pub fn apply_to(&self, post: &mut GroupPost) {
        match self {
            PostModeration::Pin => post.is_pinned = true,
            PostModeration::Unpin => post.is_pinned = false,
            PostModeration::Approve => post.is_approved = true,
            PostModeration::Unapprove => post.is_approved = false,
            PostModeration::Announce => post.is_announcement = true,
        }
        post.updated_at = Utc::now();
    }
}

/// Request payload for creating a group post.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupPostRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be between 1 and 10000 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,

    pub is_announcement: Option<bool>,
}

/// Request payload for editing a group post.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupPostRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Content must be between 1 and 10000 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: Option<String>,
}

impl UpdateGroupPostRequest {
    pub fn apply_to(&self, post: &mut GroupPost) {
        if let Some(title) = &self.title {
            post.title = Some(title.clone());
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        post.updated_at = Utc::now();
    }
}

/// Post as seen by a particular actor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupPostResponse {
    #[serde(flatten)]
    pub post: GroupPost,
    pub author_name: String,
    pub liked_by_you: bool,
}
