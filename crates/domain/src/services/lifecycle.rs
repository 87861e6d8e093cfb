//! Membership lifecycle controller.
//!
//! Every operation runs in one store transaction: lock the group row, check
//! visibility and permissions, write the transition, recount members, commit.
//! Concurrent joins therefore cannot overshoot `max_members`, and a leave
//! racing a demotion cannot leave a group without an admin.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::GroupError;
use crate::models::group::{CreateGroupRequest, UpdateGroupRequest};
use crate::models::invitation::InviteUserRequest;
use crate::models::{
    Actor, Group, GroupInvitation, GroupJoinRequest, GroupMembership, GroupRole, InviteTarget,
    JoinRequestStatus,
};
use crate::services::counters::CounterSynchronizer;
use crate::services::notification::{
    self, InvitationNotice, InvitationNotifier, NotificationType,
};
use crate::services::permissions::{check_join_eligibility, GroupAction, PermissionEvaluator};
use crate::services::store::{GroupStore, GroupTransaction};

/// Result of a join attempt.
#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// The actor is now an active member.
    Joined(GroupMembership),
    /// The group requires approval; a pending request was filed.
    Requested(GroupJoinRequest),
}

/// Orchestrates membership transitions for groups.
#[derive(Clone)]
pub struct MembershipLifecycle {
    store: Arc<dyn GroupStore>,
    notifier: Arc<dyn InvitationNotifier>,
    invitation_expiry_days: i64,
}

impl MembershipLifecycle {
    pub fn new(
        store: Arc<dyn GroupStore>,
        notifier: Arc<dyn InvitationNotifier>,
        invitation_expiry_days: i64,
    ) -> Self {
        Self {
            store,
            notifier,
            invitation_expiry_days,
        }
    }

    /// Creates a group in the actor's parish with the actor as its first admin.
    pub async fn create_group(
        &self,
        actor: &Actor,
        request: CreateGroupRequest,
    ) -> Result<Group, GroupError> {
        request.validate()?;

        let parish_id = request
            .parish_id
            .or(actor.parish_id)
            .ok_or_else(|| GroupError::validation("parish_id is required"))?;

        if !actor.is_superuser && !actor.in_parish(parish_id) {
            return Err(GroupError::forbidden(
                "You can only create groups in your own parish",
            ));
        }

        let mut tx = self.store.begin().await?;
        if !tx.parish_exists(parish_id).await? {
            return Err(GroupError::not_found("Parish not found"));
        }

        let now = Utc::now();
        let mut group = Group {
            id: Uuid::new_v4(),
            parish_id,
            name: request.name.trim().to_string(),
            description: request.description,
            group_type: request.group_type.unwrap_or_default(),
            privacy: request.privacy.unwrap_or_default(),
            created_by: actor.id,
            is_active: true,
            is_featured: false,
            allow_member_posts: request.allow_member_posts.unwrap_or(true),
            require_approval: request.require_approval.unwrap_or(false),
            max_members: request.max_members,
            member_count: 0,
            post_count: 0,
            created_at: now,
            updated_at: now,
        };
        tx.insert_group(&group).await?;

        let membership = GroupMembership::new(group.id, actor.id, GroupRole::Admin);
        tx.save_membership(&membership).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        tx.commit().await?;

        record_transition("create");
        info!(
            group_id = %group.id,
            parish_id = %group.parish_id,
            created_by = %actor.id,
            privacy = %group.privacy,
            "Group created"
        );

        Ok(group)
    }

    /// Edits group settings. Requires the admin role.
    pub async fn update_group(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request: UpdateGroupRequest,
    ) -> Result<Group, GroupError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::Edit)?;

        if request.is_featured.is_some() && !actor.is_superuser {
            return Err(GroupError::forbidden(
                "Only superusers can change the featured flag",
            ));
        }
        if let Some(max_members) = request.max_members {
            if max_members < group.member_count {
                return Err(GroupError::validation(format!(
                    "Max members cannot be lower than the current member count ({})",
                    group.member_count
                )));
            }
        }

        request.apply_to(&mut group);
        group.updated_at = Utc::now();
        tx.update_group(&group).await?;
        tx.commit().await?;

        info!(group_id = %group_id, updated_by = %actor.id, "Group updated");
        Ok(group)
    }

    /// Soft-deletes a group. Only its creator or a superuser may do so.
    pub async fn delete_group(&self, actor: &Actor, group_id: Uuid) -> Result<(), GroupError> {
        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::Delete)?;

        group.is_active = false;
        group.updated_at = Utc::now();
        tx.update_group(&group).await?;
        tx.commit().await?;

        info!(group_id = %group_id, deleted_by = %actor.id, "Group deleted");
        Ok(())
    }

    /// Joins a group directly, or files a join request when the group
    /// requires approval.
    pub async fn join(
        &self,
        actor: &Actor,
        group_id: Uuid,
        message: Option<String>,
    ) -> Result<JoinOutcome, GroupError> {
        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;
        let existing = tx.find_membership(group_id, actor.id).await?;

        ensure_visible(&PermissionEvaluator::new(actor, &group, existing.as_ref()))?;

        if existing.as_ref().map(|m| m.is_active).unwrap_or(false) {
            return Err(GroupError::conflict(
                "You are already a member of this group",
            ));
        }
        check_join_eligibility(actor.parish_id, &group)?;

        if group.require_approval {
            if tx
                .find_pending_join_request(group_id, actor.id)
                .await?
                .is_some()
            {
                return Err(GroupError::conflict(
                    "You already have a pending request for this group",
                ));
            }

            let request = GroupJoinRequest::new(group_id, actor.id, message);
            tx.save_join_request(&request).await?;
            tx.commit().await?;

            record_transition("request");
            info!(
                group_id = %group_id,
                user_id = %actor.id,
                request_id = %request.id,
                "Join request submitted"
            );
            return Ok(JoinOutcome::Requested(request));
        }

        let membership = activate_membership(existing, group_id, actor.id);
        tx.save_membership(&membership).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        tx.commit().await?;

        record_transition("join");
        info!(
            group_id = %group_id,
            user_id = %actor.id,
            member_count = group.member_count,
            "User joined group"
        );
        Ok(JoinOutcome::Joined(membership))
    }

    /// Deactivates the actor's own membership.
    pub async fn leave(&self, actor: &Actor, group_id: Uuid) -> Result<Group, GroupError> {
        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;

        let mut membership = tx
            .find_membership(group_id, actor.id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| GroupError::not_found("You are not a member of this group"))?;

        if membership.role == GroupRole::Admin && tx.count_active_admins(group_id).await? <= 1 {
            return Err(GroupError::conflict(
                "You cannot leave as you are the only admin. Please assign another admin first.",
            ));
        }

        membership.deactivate();
        tx.save_membership(&membership).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        tx.commit().await?;

        record_transition("leave");
        info!(
            group_id = %group_id,
            user_id = %actor.id,
            member_count = group.member_count,
            "User left group"
        );
        Ok(group)
    }

    /// Invites a user by id or email. Requires admin or moderator.
    pub async fn invite(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request: InviteUserRequest,
    ) -> Result<GroupInvitation, GroupError> {
        request.validate()?;
        let target = request.target()?;

        let mut tx = self.store.begin().await?;
        let group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::Invite)?;

        let invitee = match &target {
            InviteTarget::User(user_id) => tx.find_user(*user_id).await?,
            InviteTarget::Email(email) => tx.find_user_by_email(email).await?,
        }
        .filter(|u| u.is_active)
        .ok_or_else(|| GroupError::not_found("User not found"))?;

        if tx
            .find_membership(group_id, invitee.id)
            .await?
            .map(|m| m.is_active)
            .unwrap_or(false)
        {
            return Err(GroupError::conflict(
                "User is already a member of this group",
            ));
        }

        let now = Utc::now();
        let invitation = match tx.find_invitation_for(group_id, invitee.id).await? {
            Some(existing) if existing.is_pending() && !existing.is_expired(now) => {
                return Err(GroupError::conflict(
                    "User already has a pending invitation to this group",
                ));
            }
            Some(mut expired) if expired.is_pending() => {
                expired.renew(actor.id, request.message.clone(), self.invitation_expiry_days);
                expired
            }
            Some(_) => {
                return Err(GroupError::conflict(
                    "User has already responded to an invitation to this group",
                ));
            }
            None => GroupInvitation::new(
                group_id,
                invitee.id,
                actor.id,
                request.message.clone(),
                self.invitation_expiry_days,
            ),
        };
        tx.save_invitation(&invitation).await?;
        tx.commit().await?;

        record_transition("invite");
        info!(
            group_id = %group_id,
            invitation_id = %invitation.id,
            invited_user_id = %invitee.id,
            invited_by = %actor.id,
            "User invited to group"
        );

        notification::dispatch(
            self.notifier.clone(),
            notice(
                NotificationType::InvitationCreated,
                &invitation,
                &group,
                invitee.email,
            ),
        );

        Ok(invitation)
    }

    /// Approves a pending join request. Requires admin or moderator.
    ///
    /// If the requester already holds an active membership the request is
    /// closed without creating a second one.
    pub async fn approve_request(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request_id: Uuid,
    ) -> Result<GroupJoinRequest, GroupError> {
        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::ManageJoinRequests)?;

        let mut request = find_pending_request(&mut *tx, group_id, request_id).await?;
        let existing = tx.find_membership(group_id, request.user_id).await?;

        if existing.as_ref().map(|m| m.is_active).unwrap_or(false) {
            request.decide(JoinRequestStatus::Approved, actor.id, None);
            tx.save_join_request(&request).await?;
            tx.commit().await?;

            info!(
                group_id = %group_id,
                request_id = %request_id,
                "Join request approved for existing member"
            );
            return Ok(request);
        }

        let requester = tx
            .find_user(request.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| GroupError::not_found("User not found"))?;
        check_join_eligibility(requester.parish_id, &group)?;

        let new_membership = activate_membership(existing, group_id, request.user_id);
        tx.save_membership(&new_membership).await?;
        request.decide(JoinRequestStatus::Approved, actor.id, None);
        tx.save_join_request(&request).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        tx.commit().await?;

        record_transition("approve");
        info!(
            group_id = %group_id,
            request_id = %request_id,
            user_id = %request.user_id,
            approved_by = %actor.id,
            member_count = group.member_count,
            "Join request approved"
        );
        Ok(request)
    }

    /// Rejects a pending join request. Requires admin or moderator.
    pub async fn reject_request(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request_id: Uuid,
        admin_notes: Option<String>,
    ) -> Result<GroupJoinRequest, GroupError> {
        let mut tx = self.store.begin().await?;
        let group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::ManageJoinRequests)?;

        let mut request = find_pending_request(&mut *tx, group_id, request_id).await?;
        request.decide(JoinRequestStatus::Rejected, actor.id, admin_notes);
        tx.save_join_request(&request).await?;
        tx.commit().await?;

        record_transition("reject");
        info!(
            group_id = %group_id,
            request_id = %request_id,
            rejected_by = %actor.id,
            "Join request rejected"
        );
        Ok(request)
    }

    /// Accepts an invitation addressed to the actor.
    pub async fn accept_invite(
        &self,
        actor: &Actor,
        invitation_id: Uuid,
    ) -> Result<GroupMembership, GroupError> {
        let mut tx = self.store.begin().await?;
        let (mut group, mut invitation) =
            lock_invitation(&mut *tx, actor, invitation_id).await?;

        if !invitation.is_pending() {
            return Err(GroupError::conflict(
                "Invitation has already been responded to",
            ));
        }
        if invitation.is_expired(Utc::now()) {
            return Err(GroupError::Expired("This invitation has expired".to_string()));
        }

        let existing = tx.find_membership(group.id, actor.id).await?;
        let membership = match existing {
            Some(active) if active.is_active => active,
            other => {
                check_join_eligibility(actor.parish_id, &group)?;
                let membership = activate_membership(other, group.id, actor.id);
                tx.save_membership(&membership).await?;
                membership
            }
        };

        invitation.accept();
        tx.save_invitation(&invitation).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        let invitee_email = tx
            .find_user(actor.id)
            .await?
            .map(|u| u.email)
            .unwrap_or_default();
        tx.commit().await?;

        record_transition("accept");
        info!(
            group_id = %group.id,
            invitation_id = %invitation_id,
            user_id = %actor.id,
            member_count = group.member_count,
            "Invitation accepted"
        );

        notification::dispatch(
            self.notifier.clone(),
            notice(
                NotificationType::InvitationAccepted,
                &invitation,
                &group,
                invitee_email,
            ),
        );

        Ok(membership)
    }

    /// Declines an invitation addressed to the actor.
    pub async fn decline_invite(
        &self,
        actor: &Actor,
        invitation_id: Uuid,
    ) -> Result<GroupInvitation, GroupError> {
        let mut tx = self.store.begin().await?;
        let (group, mut invitation) = lock_invitation(&mut *tx, actor, invitation_id).await?;

        if !invitation.is_pending() {
            return Err(GroupError::conflict(
                "Invitation has already been responded to",
            ));
        }

        invitation.decline();
        tx.save_invitation(&invitation).await?;
        tx.commit().await?;

        record_transition("decline");
        info!(
            group_id = %group.id,
            invitation_id = %invitation_id,
            user_id = %actor.id,
            "Invitation declined"
        );
        Ok(invitation)
    }

    /// Promotes or demotes a member. Requires the admin role.
    pub async fn change_role(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> Result<GroupMembership, GroupError> {
        let mut tx = self.store.begin().await?;
        let group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;
        evaluator.authorize(GroupAction::ChangeRole)?;

        let mut target = find_active_membership(&mut *tx, group_id, user_id).await?;
        if target.role == role {
            return Ok(target);
        }

        if target.role == GroupRole::Admin && tx.count_active_admins(group_id).await? <= 1 {
            return Err(GroupError::conflict(
                "Cannot demote the only admin of this group. Promote another member first.",
            ));
        }

        let previous = target.role;
        target.role = role;
        target.updated_at = Utc::now();
        tx.save_membership(&target).await?;
        tx.commit().await?;

        record_transition(if rank(role) > rank(previous) {
            "promote"
        } else {
            "demote"
        });
        info!(
            group_id = %group_id,
            user_id = %user_id,
            from = %previous,
            to = %role,
            changed_by = %actor.id,
            "Member role changed"
        );
        Ok(target)
    }

    /// Removes another member. Requires admin or moderator; moderators may
    /// not remove admins.
    pub async fn remove_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Group, GroupError> {
        let mut tx = self.store.begin().await?;
        let mut group = load_group(&mut *tx, group_id).await?;
        let membership = tx.find_membership(group_id, actor.id).await?;

        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        ensure_visible(&evaluator)?;

        let mut target = find_active_membership(&mut *tx, group_id, user_id).await?;
        evaluator.authorize(GroupAction::RemoveMember {
            target_role: target.role,
        })?;

        if target.role == GroupRole::Admin && tx.count_active_admins(group_id).await? <= 1 {
            return Err(GroupError::conflict(
                "Cannot remove the only admin of this group",
            ));
        }

        target.deactivate();
        tx.save_membership(&target).await?;
        CounterSynchronizer::sync_members(&mut *tx, &mut group).await?;
        tx.commit().await?;

        record_transition("remove");
        info!(
            group_id = %group_id,
            user_id = %user_id,
            removed_by = %actor.id,
            member_count = group.member_count,
            "Member removed from group"
        );
        Ok(group)
    }

    /// Updates the actor's own notification preference.
    pub async fn set_notifications(
        &self,
        actor: &Actor,
        group_id: Uuid,
        enabled: bool,
    ) -> Result<GroupMembership, GroupError> {
        let mut tx = self.store.begin().await?;
        load_group(&mut *tx, group_id).await?;

        let mut membership = tx
            .find_membership(group_id, actor.id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| GroupError::not_found("You are not a member of this group"))?;

        membership.notifications_enabled = enabled;
        membership.updated_at = Utc::now();
        tx.save_membership(&membership).await?;
        tx.commit().await?;

        info!(
            group_id = %group_id,
            user_id = %actor.id,
            notifications_enabled = enabled,
            "Membership notifications updated"
        );
        Ok(membership)
    }
}

/// Locks an active group, treating inactive groups as missing.
pub(crate) async fn load_group(
    tx: &mut dyn GroupTransaction,
    group_id: Uuid,
) -> Result<Group, GroupError> {
    tx.lock_group(group_id)
        .await?
        .filter(|g| g.is_active)
        .ok_or_else(|| GroupError::not_found("Group not found"))
}

/// Groups the actor cannot see are reported as missing.
pub(crate) fn ensure_visible(evaluator: &PermissionEvaluator<'_>) -> Result<(), GroupError> {
    if evaluator.can_view() {
        Ok(())
    } else {
        Err(GroupError::not_found("Group not found"))
    }
}

async fn find_active_membership(
    tx: &mut dyn GroupTransaction,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupMembership, GroupError> {
    tx.find_membership(group_id, user_id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| GroupError::not_found("Membership not found"))
}

async fn find_pending_request(
    tx: &mut dyn GroupTransaction,
    group_id: Uuid,
    request_id: Uuid,
) -> Result<GroupJoinRequest, GroupError> {
    tx.find_join_request(request_id)
        .await?
        .filter(|r| r.group_id == group_id && r.is_pending())
        .ok_or_else(|| GroupError::not_found("Join request not found"))
}

/// Locks the invitation's group, then re-reads the invitation under that lock.
async fn lock_invitation(
    tx: &mut dyn GroupTransaction,
    actor: &Actor,
    invitation_id: Uuid,
) -> Result<(Group, GroupInvitation), GroupError> {
    let not_found = || GroupError::not_found("Invitation not found");

    let group_id = tx
        .find_invitation(invitation_id)
        .await?
        .filter(|i| i.invited_user_id == actor.id)
        .map(|i| i.group_id)
        .ok_or_else(not_found)?;

    let group = tx
        .lock_group(group_id)
        .await?
        .filter(|g| g.is_active)
        .ok_or_else(not_found)?;
    let invitation = tx
        .find_invitation(invitation_id)
        .await?
        .ok_or_else(not_found)?;

    Ok((group, invitation))
}

/// Reactivates the existing row for (group, user) or creates a new one.
fn activate_membership(
    existing: Option<GroupMembership>,
    group_id: Uuid,
    user_id: Uuid,
) -> GroupMembership {
    match existing {
        Some(mut membership) => {
            membership.rejoin();
            membership
        }
        None => GroupMembership::new(group_id, user_id, GroupRole::Member),
    }
}

fn rank(role: GroupRole) -> u8 {
    match role {
        GroupRole::Member => 0,
        GroupRole::Moderator => 1,
        GroupRole::Admin => 2,
    }
}

fn notice(
    notification_type: NotificationType,
    invitation: &GroupInvitation,
    group: &Group,
    invited_email: String,
) -> InvitationNotice {
    InvitationNotice {
        notification_type,
        invitation_id: invitation.id,
        group_id: group.id,
        group_name: group.name.clone(),
        invited_user_id: invitation.invited_user_id,
        invited_email,
        invited_by: invitation.invited_by,
        message: invitation.message.clone(),
        expires_at: invitation.expires_at,
    }
}

fn record_transition(transition: &'static str) {
    metrics::counter!("group_membership_transitions_total", "transition" => transition)
        .increment(1);
}
