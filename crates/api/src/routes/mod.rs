//! HTTP route handlers.

pub mod group_events;
pub mod group_posts;
pub mod groups;
pub mod health;
pub mod invitations;
pub mod join_requests;
pub mod memberships;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use domain::models::{Actor, Group, GroupMembership};
use domain::services::PermissionEvaluator;
use persistence::repositories::{GroupRepository, MembershipRepository};
use serde::Deserialize;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Groups
        .route("/groups", post(groups::create_group).get(groups::list_groups))
        .route("/groups/mine", get(groups::list_my_groups))
        .route("/groups/featured", get(groups::list_featured_groups))
        .route(
            "/groups/:group_id",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        // Membership
        .route("/groups/:group_id/join", post(memberships::join_group))
        .route("/groups/:group_id/leave", post(memberships::leave_group))
        .route("/groups/:group_id/members", get(memberships::list_members))
        .route(
            "/groups/:group_id/members/me",
            patch(memberships::update_my_membership),
        )
        .route(
            "/groups/:group_id/members/:user_id",
            delete(memberships::remove_member),
        )
        .route(
            "/groups/:group_id/members/:user_id/role",
            post(memberships::change_role),
        )
        // Join requests
        .route(
            "/groups/:group_id/join-requests",
            get(join_requests::list_join_requests),
        )
        .route(
            "/groups/:group_id/join-requests/:request_id/approve",
            post(join_requests::approve_join_request),
        )
        .route(
            "/groups/:group_id/join-requests/:request_id/reject",
            post(join_requests::reject_join_request),
        )
        // Invitations
        .route("/groups/:group_id/invite", post(invitations::invite_user))
        .route("/invitations", get(invitations::list_my_invitations))
        .route(
            "/invitations/:invitation_id/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/invitations/:invitation_id/decline",
            post(invitations::decline_invitation),
        )
        // Posts
        .route(
            "/groups/:group_id/posts",
            get(group_posts::list_posts).post(group_posts::create_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id",
            patch(group_posts::update_post).delete(group_posts::delete_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/pin",
            post(group_posts::pin_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/unpin",
            post(group_posts::unpin_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/approve",
            post(group_posts::approve_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/unapprove",
            post(group_posts::unapprove_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/announce",
            post(group_posts::announce_post),
        )
        .route(
            "/groups/:group_id/posts/:post_id/like",
            post(group_posts::like_post).delete(group_posts::unlike_post),
        )
        // Events
        .route("/events/upcoming", get(group_events::list_upcoming_events))
        .route(
            "/groups/:group_id/events",
            get(group_events::list_events).post(group_events::create_event),
        )
        .route(
            "/groups/:group_id/events/:event_id",
            get(group_events::get_event)
                .patch(group_events::update_event)
                .delete(group_events::delete_event),
        )
}

/// A group loaded for read handlers together with the caller's membership row.
pub(crate) struct GroupAccess {
    pub group: Group,
    pub membership: Option<GroupMembership>,
}

impl GroupAccess {
    pub fn evaluator<'a>(&'a self, actor: &'a Actor) -> PermissionEvaluator<'a> {
        PermissionEvaluator::new(actor, &self.group, self.membership.as_ref())
    }
}

/// Loads an active group and the actor's membership.
///
/// Groups the actor may not see are reported as missing.
pub(crate) async fn load_visible_group(
    state: &AppState,
    actor: &Actor,
    group_id: Uuid,
) -> Result<GroupAccess, ApiError> {
    let group: Group = GroupRepository::new(state.pool.clone())
        .find_active_by_id(group_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let membership: Option<GroupMembership> = MembershipRepository::new(state.pool.clone())
        .find(group_id, actor.id)
        .await?
        .map(Into::into);

    let access = GroupAccess { group, membership };
    if !access.evaluator(actor).can_view() {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }
    Ok(access)
}

/// Normalizes list paging against the configured page sizes.
pub(crate) fn page_request(state: &AppState, page: Option<i64>, per_page: Option<i64>) -> PageRequest {
    PageRequest::new(
        page,
        per_page,
        state.config.groups.default_page_size,
        state.config.groups.max_page_size,
    )
}

/// Plain paging query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
