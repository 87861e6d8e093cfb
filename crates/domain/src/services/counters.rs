//! Denormalized counter maintenance.
//!
//! Counts are always recomputed from the underlying rows, never adjusted
//! incrementally, and always inside the transaction that changed those rows.

use tracing::debug;

use crate::error::GroupError;
use crate::models::{Group, GroupMembership, GroupPost};
use crate::services::store::GroupTransaction;

/// Recomputes group and post counters after a mutation.
pub struct CounterSynchronizer;

impl CounterSynchronizer {
    /// Refreshes `group.member_count` after a membership change.
    pub async fn sync_members(
        tx: &mut dyn GroupTransaction,
        group: &mut Group,
    ) -> Result<(), GroupError> {
        let count = tx.recount_members(group.id).await?;
        debug!(
            group_id = %group.id,
            previous = group.member_count,
            member_count = count,
            "Recounted group members"
        );
        group.member_count = count;
        Ok(())
    }

    /// Refreshes `group.post_count` after a post change.
    pub async fn sync_posts(
        tx: &mut dyn GroupTransaction,
        group: &mut Group,
    ) -> Result<(), GroupError> {
        let count = tx.recount_posts(group.id).await?;
        debug!(
            group_id = %group.id,
            previous = group.post_count,
            post_count = count,
            "Recounted group posts"
        );
        group.post_count = count;
        Ok(())
    }

    /// Refreshes `post.likes_count` after a reaction change.
    pub async fn sync_likes(
        tx: &mut dyn GroupTransaction,
        post: &mut GroupPost,
    ) -> Result<(), GroupError> {
        let count = tx.recount_post_likes(post.id).await?;
        debug!(post_id = %post.id, likes_count = count, "Recounted post likes");
        post.likes_count = count;
        Ok(())
    }
}

/// Number of active memberships.
pub fn count_active_members<'a>(memberships: impl IntoIterator<Item = &'a GroupMembership>) -> i32 {
    memberships.into_iter().filter(|m| m.is_active).count() as i32
}

/// Number of approved, non-deleted posts.
pub fn count_visible_posts<'a>(posts: impl IntoIterator<Item = &'a GroupPost>) -> i32 {
    posts.into_iter().filter(|p| p.is_visible()).count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group_post::CreateGroupPostRequest;
    use crate::models::GroupRole;
    use uuid::Uuid;

    #[test]
    fn test_count_active_members() {
        let group_id = Uuid::new_v4();
        let mut left = GroupMembership::new(group_id, Uuid::new_v4(), GroupRole::Member);
        left.deactivate();
        let memberships = vec![
            GroupMembership::new(group_id, Uuid::new_v4(), GroupRole::Admin),
            GroupMembership::new(group_id, Uuid::new_v4(), GroupRole::Member),
            left,
        ];
        assert_eq!(count_active_members(&memberships), 2);
        assert_eq!(count_active_members(&Vec::<GroupMembership>::new()), 0);
    }

    #[test]
    fn test_count_visible_posts() {
        let group_id = Uuid::new_v4();
        let new_post = || {
            GroupPost::new(
                group_id,
                Uuid::new_v4(),
                CreateGroupPostRequest {
                    title: None,
                    content: "Hello".to_string(),
                    is_announcement: None,
                },
            )
        };

        let mut hidden = new_post();
        hidden.is_approved = false;
        let mut deleted = new_post();
        deleted.is_deleted = true;

        let posts = vec![new_post(), new_post(), hidden, deleted];
        assert_eq!(count_visible_posts(&posts), 2);
    }
}
