//! Group membership routes: join, leave, member listing and role changes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::join_request::JoinGroupRequest;
use domain::models::membership::{ChangeRoleRequest, MemberResponse, UpdateNotificationsRequest};
use domain::models::{Group, GroupJoinRequest, GroupMembership, GroupRole};
use domain::services::JoinOutcome;
use persistence::repositories::MembershipRepository;
use serde::Serialize;
use shared::pagination::Pagination;
use uuid::Uuid;
use validator::Validate;

use super::{load_visible_group, page_request, PageQuery};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Outcome of a join call.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JoinResponse {
    Joined { membership: GroupMembership },
    Requested { join_request: GroupJoinRequest },
}

impl IntoResponse for JoinResponse {
    fn into_response(self) -> Response {
        let status = match &self {
            JoinResponse::Joined { .. } => StatusCode::OK,
            JoinResponse::Requested { .. } => StatusCode::ACCEPTED,
        };
        (status, Json(self)).into_response()
    }
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        match outcome {
            JoinOutcome::Joined(membership) => JoinResponse::Joined { membership },
            JoinOutcome::Requested(join_request) => JoinResponse::Requested { join_request },
        }
    }
}

/// Response for member listing.
#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub data: Vec<MemberResponse>,
    pub pagination: Pagination,
}

/// Join a group, or ask to join when it requires approval.
///
/// POST /api/v1/groups/:group_id/join
///
/// Answers 200 with the membership, or 202 with the pending request.
pub async fn join_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    request: Option<Json<JoinGroupRequest>>,
) -> Result<JoinResponse, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let outcome = state
        .lifecycle
        .join(&user_auth.actor, group_id, request.message)
        .await?;

    Ok(JoinResponse::from(outcome))
}

/// Leave a group.
///
/// POST /api/v1/groups/:group_id/leave
///
/// The last admin cannot leave.
pub async fn leave_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let group = state.lifecycle.leave(&user_auth.actor, group_id).await?;

    Ok(Json(group))
}

/// List the active members of a group.
///
/// GET /api/v1/groups/:group_id/members
pub async fn list_members(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    load_visible_group(&state, &user_auth.actor, group_id).await?;

    let repo = MembershipRepository::new(state.pool.clone());
    let page = page_request(&state, query.page, query.per_page);

    let members = repo
        .list_active_members(group_id, page.limit(), page.offset())
        .await?;
    let total = repo.count_active_members(group_id).await?;

    Ok(Json(ListMembersResponse {
        data: members.into_iter().map(Into::into).collect(),
        pagination: page.paginate(total),
    }))
}

/// Promote or demote a member.
///
/// POST /api/v1/groups/:group_id/members/:user_id/role
pub async fn change_role(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<GroupMembership>, ApiError> {
    request.validate()?;
    let role: GroupRole = request.role.parse().map_err(ApiError::Validation)?;

    let membership = state
        .lifecycle
        .change_role(&user_auth.actor, group_id, user_id, role)
        .await?;

    Ok(Json(membership))
}

/// Remove a member from a group.
///
/// DELETE /api/v1/groups/:group_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Group>, ApiError> {
    let group = state
        .lifecycle
        .remove_member(&user_auth.actor, group_id, user_id)
        .await?;

    Ok(Json(group))
}

/// Toggle the caller's notifications for a group.
///
/// PATCH /api/v1/groups/:group_id/members/me
pub async fn update_my_membership(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateNotificationsRequest>,
) -> Result<Json<GroupMembership>, ApiError> {
    let membership = state
        .lifecycle
        .set_notifications(&user_auth.actor, group_id, request.notifications_enabled)
        .await?;

    Ok(Json(membership))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_requested_join_answers_accepted() {
        let request = GroupJoinRequest::new(Uuid::new_v4(), Uuid::new_v4(), Some("Hi".into()));
        let response = JoinResponse::from(JoinOutcome::Requested(request)).into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "requested");
        assert_eq!(body["join_request"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_direct_join_answers_ok() {
        let membership = GroupMembership::new(Uuid::new_v4(), Uuid::new_v4(), GroupRole::Member);
        let response = JoinResponse::from(JoinOutcome::Joined(membership)).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "joined");
        assert_eq!(body["membership"]["role"], "member");
    }
}
