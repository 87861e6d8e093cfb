//! Invitation routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::invitation::{InvitationResponse, InviteUserRequest};
use domain::models::{GroupInvitation, GroupMembership};
use persistence::repositories::InvitationRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Invite a user by id or email.
///
/// POST /api/v1/groups/:group_id/invite
///
/// Admins and moderators only. A stale unanswered invitation for the same
/// user is renewed.
pub async fn invite_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<InviteUserRequest>,
) -> Result<(StatusCode, Json<GroupInvitation>), ApiError> {
    let invitation = state
        .lifecycle
        .invite(&user_auth.actor, group_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Unanswered invitations addressed to the caller.
///
/// GET /api/v1/invitations
pub async fn list_my_invitations(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let now = Utc::now();
    let invitations = InvitationRepository::new(state.pool.clone())
        .list_unanswered_for_user(user_auth.user_id)
        .await?;

    Ok(Json(
        invitations
            .into_iter()
            .map(|row| InvitationResponse::new(row.invitation.into(), row.group_name, now))
            .collect(),
    ))
}

/// Accept an invitation and join the group.
///
/// POST /api/v1/invitations/:invitation_id/accept
///
/// Expired invitations answer 410.
pub async fn accept_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<GroupMembership>, ApiError> {
    let membership = state
        .lifecycle
        .accept_invite(&user_auth.actor, invitation_id)
        .await?;

    Ok(Json(membership))
}

/// Decline an invitation.
///
/// POST /api/v1/invitations/:invitation_id/decline
pub async fn decline_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(invitation_id): Path<Uuid>,
) -> Result<Json<GroupInvitation>, ApiError> {
    let invitation = state
        .lifecycle
        .decline_invite(&user_auth.actor, invitation_id)
        .await?;

    Ok(Json(invitation))
}
