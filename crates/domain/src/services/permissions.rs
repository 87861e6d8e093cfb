//! Role-to-action rules for groups.
//!
//! Every authorization decision about a group goes through
//! [`PermissionEvaluator`]. It never mutates state.

use uuid::Uuid;

use crate::error::GroupError;
use crate::models::{Actor, Group, GroupMembership, GroupPrivacy, GroupRole};
use crate::services::visibility;

/// Actions that can be attempted against a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    View,
    Edit,
    Delete,
    Invite,
    ManageJoinRequests,
    ChangeRole,
    RemoveMember { target_role: GroupRole },
    ModeratePost,
    CreatePost { announcement: bool },
    EditPost { author_id: Uuid },
    CreateEvent,
    EditEvent { creator_id: Uuid },
}

/// Evaluates an actor's rights on one group.
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    actor: &'a Actor,
    group: &'a Group,
    membership: Option<&'a GroupMembership>,
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(actor: &'a Actor, group: &'a Group, membership: Option<&'a GroupMembership>) -> Self {
        Self {
            actor,
            group,
            membership,
        }
    }

    /// The actor's role in the group, derived from the active membership.
    pub fn role(&self) -> Option<GroupRole> {
        self.membership
            .filter(|m| m.user_id == self.actor.id && m.group_id == self.group.id)
            .and_then(GroupMembership::active_role)
    }

    pub fn can_view(&self) -> bool {
        visibility::can_view(self.actor, self.group, self.membership)
    }

    pub fn is_allowed(&self, action: GroupAction) -> bool {
        let role = self.role();

        // Authoring requires an active membership even for superusers.
        match action {
            GroupAction::CreatePost { announcement } => {
                return match role {
                    Some(r) if r.can_moderate_content() => true,
                    Some(_) => self.group.allow_member_posts && !announcement,
                    None => false,
                };
            }
            GroupAction::CreateEvent => {
                return match role {
                    Some(r) if r.can_moderate_content() => true,
                    Some(_) => self.group.allow_member_posts,
                    None => false,
                };
            }
            _ => {}
        }

        if self.actor.is_superuser {
            return true;
        }

        match action {
            GroupAction::View => self.can_view(),
            GroupAction::Edit => role.map(|r| r.can_edit_group()).unwrap_or(false),
            GroupAction::Delete => self.group.created_by == self.actor.id,
            GroupAction::Invite | GroupAction::ManageJoinRequests => {
                role.map(|r| r.can_manage_members()).unwrap_or(false)
            }
            GroupAction::ChangeRole => role.map(|r| r.can_change_roles()).unwrap_or(false),
            GroupAction::RemoveMember { target_role } => {
                role.map(|r| r.can_remove(target_role)).unwrap_or(false)
            }
            GroupAction::ModeratePost => role.map(|r| r.can_moderate_content()).unwrap_or(false),
            GroupAction::EditPost { author_id } => {
                (author_id == self.actor.id && role.is_some())
                    || role.map(|r| r.can_moderate_content()).unwrap_or(false)
            }
            GroupAction::EditEvent { creator_id } => {
                creator_id == self.actor.id
                    || role.map(|r| r.can_moderate_content()).unwrap_or(false)
            }
            GroupAction::CreatePost { .. } | GroupAction::CreateEvent => false,
        }
    }

    /// Returns `PermissionDenied` with a caller-facing reason if the action
    /// is not allowed.
    pub fn authorize(&self, action: GroupAction) -> Result<(), GroupError> {
        if self.is_allowed(action) {
            return Ok(());
        }

        let reason = match action {
            GroupAction::View => "You do not have access to this group",
            GroupAction::Edit => "Only group admins can edit this group",
            GroupAction::Delete => "Only the group creator can delete this group",
            GroupAction::Invite => "You don't have permission to invite users to this group",
            GroupAction::ManageJoinRequests => {
                "You don't have permission to manage join requests for this group"
            }
            GroupAction::ChangeRole => "Only group admins can change member roles",
            GroupAction::RemoveMember {
                target_role: GroupRole::Admin,
            } if self.role() == Some(GroupRole::Moderator) => "Moderators cannot remove admins",
            GroupAction::RemoveMember { .. } => "You don't have permission to remove members",
            GroupAction::ModeratePost => "Only group admins and moderators can moderate posts",
            GroupAction::CreatePost { .. } if self.role().is_none() => {
                "You must be a member of this group to post"
            }
            GroupAction::CreatePost { announcement: true } => {
                "Only group admins and moderators can post announcements"
            }
            GroupAction::CreatePost { .. } => "Only group admins and moderators can post in this group",
            GroupAction::EditPost { .. } => "You can only modify your own posts",
            GroupAction::CreateEvent if self.role().is_none() => {
                "You must be a member of this group to create events"
            }
            GroupAction::CreateEvent => "Only group admins and moderators can create events",
            GroupAction::EditEvent { .. } => "You can only modify events you created",
        };

        Err(GroupError::forbidden(reason))
    }
}

/// Checks whether a user from `parish_id` may become a member of `group`.
///
/// The group must be active and below capacity, and the user must belong to
/// the group's parish unless the group is public.
pub fn check_join_eligibility(parish_id: Option<Uuid>, group: &Group) -> Result<(), GroupError> {
    if !group.is_active {
        return Err(GroupError::not_found("Group not found"));
    }
    if group.is_full() {
        return Err(GroupError::conflict("Group is full"));
    }
    if group.privacy != GroupPrivacy::Public && parish_id != Some(group.parish_id) {
        return Err(GroupError::forbidden(
            "You can only join groups in your own parish",
        ));
    }
    Ok(())
}
