//! Join request review routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::join_request::{JoinRequestResponse, RejectJoinRequestRequest};
use domain::models::GroupJoinRequest;
use domain::services::GroupAction;
use persistence::repositories::JoinRequestRepository;
use uuid::Uuid;
use validator::Validate;

use super::load_visible_group;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Pending join requests of a group, oldest first.
///
/// GET /api/v1/groups/:group_id/join-requests
///
/// Admins and moderators only.
pub async fn list_join_requests(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<JoinRequestResponse>>, ApiError> {
    let access = load_visible_group(&state, &user_auth.actor, group_id).await?;
    access
        .evaluator(&user_auth.actor)
        .authorize(GroupAction::ManageJoinRequests)?;

    let requests = JoinRequestRepository::new(state.pool.clone())
        .list_pending(group_id)
        .await?;

    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Approve a pending join request.
///
/// POST /api/v1/groups/:group_id/join-requests/:request_id/approve
pub async fn approve_join_request(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, request_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupJoinRequest>, ApiError> {
    let request = state
        .lifecycle
        .approve_request(&user_auth.actor, group_id, request_id)
        .await?;

    Ok(Json(request))
}

/// Reject a pending join request.
///
/// POST /api/v1/groups/:group_id/join-requests/:request_id/reject
pub async fn reject_join_request(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, request_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<RejectJoinRequestRequest>>,
) -> Result<Json<GroupJoinRequest>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    body.validate()?;

    let request = state
        .lifecycle
        .reject_request(&user_auth.actor, group_id, request_id, body.admin_notes)
        .await?;

    Ok(Json(request))
}
