//! Visibility rules for groups and group-scoped content.

use crate::models::{Actor, Group, GroupMembership, GroupPrivacy};

/// Decides whether `actor` may see `group` and its members, posts, events
/// and join requests.
///
/// `membership` is the actor's membership row for this group, if any.
pub fn can_view(actor: &Actor, group: &Group, membership: Option<&GroupMembership>) -> bool {
    if actor.is_superuser {
        return true;
    }

    match group.privacy {
        GroupPrivacy::Public => true,
        GroupPrivacy::ParishOnly => actor.in_parish(group.parish_id),
        GroupPrivacy::Private | GroupPrivacy::InviteOnly => {
            is_active_member(actor, group, membership)
        }
    }
}

fn is_active_member(actor: &Actor, group: &Group, membership: Option<&GroupMembership>) -> bool {
    membership
        .map(|m| m.is_active && m.user_id == actor.id && m.group_id == group.id)
        .unwrap_or(false)
}
