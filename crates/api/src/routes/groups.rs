//! Group management routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{
    CreateGroupRequest, GroupResponse, ListGroupsQuery, ListGroupsResponse, UpdateGroupRequest,
};
use domain::models::{Group, GroupRole};
use domain::services::check_join_eligibility;
use persistence::repositories::{GroupListFilter, GroupRepository};
use shared::validation::contains_pattern;
use uuid::Uuid;

use super::{load_visible_group, page_request};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Number of groups on the featured shelf.
const FEATURED_LIMIT: i64 = 10;

/// Create a new group.
///
/// POST /api/v1/groups
///
/// The creator becomes the first admin.
pub async fn create_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let group = state.lifecycle.create_group(&user_auth.actor, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupResponse {
            group,
            your_role: Some(GroupRole::Admin),
            can_join: false,
        }),
    ))
}

fn list_filter(query: &ListGroupsQuery) -> GroupListFilter {
    GroupListFilter {
        group_type: query.group_type.map(Into::into),
        privacy: query.privacy.map(Into::into),
        parish_id: query.parish_id,
        featured: query.featured,
        search_pattern: query.search.as_deref().and_then(contains_pattern),
    }
}

/// List groups visible to the caller.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let page = page_request(&state, query.page, query.per_page);
    let filter = list_filter(&query);

    let groups = repo
        .list_visible(&user_auth.actor, &filter, page.limit(), page.offset())
        .await?;
    let total = repo.count_visible(&user_auth.actor, &filter).await?;

    Ok(Json(ListGroupsResponse {
        data: groups.into_iter().map(Into::into).collect(),
        pagination: page.paginate(total),
    }))
}

/// List the caller's own groups.
///
/// GET /api/v1/groups/mine
pub async fn list_my_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone())
        .list_for_member(user_auth.user_id)
        .await?;

    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// Featured groups the caller can see.
///
/// GET /api/v1/groups/featured
pub async fn list_featured_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone())
        .list_featured(&user_auth.actor, FEATURED_LIMIT)
        .await?;

    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// Group details.
///
/// GET /api/v1/groups/:group_id
///
/// Hidden groups answer 404.
pub async fn get_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupResponse>, ApiError> {
    let access = load_visible_group(&state, &user_auth.actor, group_id).await?;
    let your_role = access.evaluator(&user_auth.actor).role();

    let can_join = your_role.is_none()
        && !access.group.privacy.is_members_only()
        && check_join_eligibility(user_auth.actor.parish_id, &access.group).is_ok();

    Ok(Json(GroupResponse {
        group: access.group,
        your_role,
        can_join,
    }))
}

/// Update group settings.
///
/// PATCH /api/v1/groups/:group_id
///
/// Admins only.
pub async fn update_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = state
        .lifecycle
        .update_group(&user_auth.actor, group_id, request)
        .await?;

    Ok(Json(group))
}

/// Deactivate a group.
///
/// DELETE /api/v1/groups/:group_id
///
/// Admins only. The group disappears from every listing.
pub async fn delete_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .lifecycle
        .delete_group(&user_auth.actor, group_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
