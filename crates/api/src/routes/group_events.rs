//! Group event routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::group_event::{
    CreateGroupEventRequest, ListEventsQuery, UpdateGroupEventRequest,
};
use domain::models::GroupEvent;
use persistence::repositories::{GroupEventRepository, GroupRepository};
use serde::Serialize;
use shared::pagination::Pagination;
use uuid::Uuid;

use super::{load_visible_group, page_request};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Number of events in the upcoming feed.
const UPCOMING_LIMIT: i64 = 20;

/// Response for event listing.
#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub data: Vec<GroupEvent>,
    pub pagination: Pagination,
}

/// Events of a group by start time.
///
/// GET /api/v1/groups/:group_id/events
pub async fn list_events(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    load_visible_group(&state, &user_auth.actor, group_id).await?;

    let repo = GroupEventRepository::new(state.pool.clone());
    let page = page_request(&state, query.page, query.per_page);
    let ending_after = query.upcoming.unwrap_or(false).then(Utc::now);

    let events = repo
        .list_for_group(group_id, ending_after, page.limit(), page.offset())
        .await?;
    let total = repo.count_for_group(group_id, ending_after).await?;

    Ok(Json(ListEventsResponse {
        data: events.into_iter().map(Into::into).collect(),
        pagination: page.paginate(total),
    }))
}

/// Upcoming events across all groups the caller can see, plus public events.
///
/// GET /api/v1/events/upcoming
pub async fn list_upcoming_events(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<GroupEvent>>, ApiError> {
    let events = GroupEventRepository::new(state.pool.clone())
        .list_upcoming(&user_auth.actor, Utc::now(), UPCOMING_LIMIT)
        .await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Event details.
///
/// GET /api/v1/groups/:group_id/events/:event_id
///
/// Public events of an active group are readable by anyone signed in.
pub async fn get_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupEvent>, ApiError> {
    let event: GroupEvent = GroupEventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .filter(|e| e.group_id == group_id)
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if event.is_public {
        // Public events of a deactivated group are gone with the group
        GroupRepository::new(state.pool.clone())
            .find_active_by_id(group_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;
    } else {
        load_visible_group(&state, &user_auth.actor, group_id)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => ApiError::NotFound("Event not found".to_string()),
                other => other,
            })?;
    }

    Ok(Json(event))
}

/// Schedule an event.
///
/// POST /api/v1/groups/:group_id/events
pub async fn create_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateGroupEventRequest>,
) -> Result<(StatusCode, Json<GroupEvent>), ApiError> {
    let event = state
        .content
        .create_event(&user_auth.actor, group_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Edit an event.
///
/// PATCH /api/v1/groups/:group_id/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, event_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGroupEventRequest>,
) -> Result<Json<GroupEvent>, ApiError> {
    let event = state
        .content
        .update_event(&user_auth.actor, group_id, event_id, request)
        .await?;

    Ok(Json(event))
}

/// Delete an event.
///
/// DELETE /api/v1/groups/:group_id/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .content
        .delete_event(&user_auth.actor, group_id, event_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
