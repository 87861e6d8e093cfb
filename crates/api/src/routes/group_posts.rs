//! Group post routes: feed, authoring, moderation and likes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::group_post::{
    CreateGroupPostRequest, GroupPostResponse, UpdateGroupPostRequest,
};
use domain::models::{GroupPost, PostModeration};
use persistence::repositories::GroupPostRepository;
use serde::Serialize;
use shared::pagination::Pagination;
use uuid::Uuid;

use super::{load_visible_group, page_request, PageQuery};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Response for the post feed.
#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    pub data: Vec<GroupPostResponse>,
    pub pagination: Pagination,
}

/// Approved posts of a group, pinned first.
///
/// GET /api/v1/groups/:group_id/posts
pub async fn list_posts(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListPostsResponse>, ApiError> {
    load_visible_group(&state, &user_auth.actor, group_id).await?;

    let repo = GroupPostRepository::new(state.pool.clone());
    let page = page_request(&state, query.page, query.per_page);

    let posts = repo
        .list_visible(group_id, user_auth.user_id, page.limit(), page.offset())
        .await?;
    let total = repo.count_visible(group_id).await?;

    Ok(Json(ListPostsResponse {
        data: posts.into_iter().map(Into::into).collect(),
        pagination: page.paginate(total),
    }))
}

/// Publish a post.
///
/// POST /api/v1/groups/:group_id/posts
pub async fn create_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateGroupPostRequest>,
) -> Result<(StatusCode, Json<GroupPost>), ApiError> {
    let post = state
        .content
        .create_post(&user_auth.actor, group_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post.
///
/// PATCH /api/v1/groups/:group_id/posts/:post_id
pub async fn update_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGroupPostRequest>,
) -> Result<Json<GroupPost>, ApiError> {
    let post = state
        .content
        .update_post(&user_auth.actor, group_id, post_id, request)
        .await?;

    Ok(Json(post))
}

/// Soft-delete a post.
///
/// DELETE /api/v1/groups/:group_id/posts/:post_id
pub async fn delete_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .content
        .delete_post(&user_auth.actor, group_id, post_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn moderate(
    state: &AppState,
    user_auth: &UserAuth,
    group_id: Uuid,
    post_id: Uuid,
    action: PostModeration,
) -> Result<Json<GroupPost>, ApiError> {
    let post = state
        .content
        .moderate_post(&user_auth.actor, group_id, post_id, action)
        .await?;

    Ok(Json(post))
}

/// POST /api/v1/groups/:group_id/posts/:post_id/pin
pub async fn pin_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    moderate(&state, &user_auth, group_id, post_id, PostModeration::Pin).await
}

/// POST /api/v1/groups/:group_id/posts/:post_id/unpin
pub async fn unpin_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    moderate(&state, &user_auth, group_id, post_id, PostModeration::Unpin).await
}

/// POST /api/v1/groups/:group_id/posts/:post_id/approve
pub async fn approve_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    moderate(&state, &user_auth, group_id, post_id, PostModeration::Approve).await
}

/// Hide a post from the feed without deleting it.
///
/// POST /api/v1/groups/:group_id/posts/:post_id/unapprove
pub async fn unapprove_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    moderate(&state, &user_auth, group_id, post_id, PostModeration::Unapprove).await
}

/// POST /api/v1/groups/:group_id/posts/:post_id/announce
pub async fn announce_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    moderate(&state, &user_auth, group_id, post_id, PostModeration::Announce).await
}

/// Like a post. Liking twice is a conflict.
///
/// POST /api/v1/groups/:group_id/posts/:post_id/like
pub async fn like_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    let post = state
        .content
        .like_post(&user_auth.actor, group_id, post_id)
        .await?;

    Ok(Json(post))
}

/// Remove the caller's like.
///
/// DELETE /api/v1/groups/:group_id/posts/:post_id/like
pub async fn unlike_post(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupPost>, ApiError> {
    let post = state
        .content
        .unlike_post(&user_auth.actor, group_id, post_id)
        .await?;

    Ok(Json(post))
}
