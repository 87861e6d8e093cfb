//! Store traits the lifecycle and content services mutate through.
//!
//! A [`GroupTransaction`] is one atomic unit of work. Dropping it without
//! calling [`GroupTransaction::commit`] discards every write.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Group, GroupEvent, GroupInvitation, GroupJoinRequest, GroupMembership, GroupPost, Reaction,
    ReactionTarget, User,
};

/// Opens transactions against the group store.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn GroupTransaction>, StoreError>;
}

/// Reads and writes within a single transaction.
#[async_trait]
pub trait GroupTransaction: Send {
    async fn parish_exists(&mut self, parish_id: Uuid) -> Result<bool, StoreError>;

    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError>;

    /// Loads the group and holds a write lock on it until the transaction ends.
    async fn lock_group(&mut self, group_id: Uuid) -> Result<Option<Group>, StoreError>;

    async fn insert_group(&mut self, group: &Group) -> Result<(), StoreError>;

    /// Writes the group's editable attributes. Counters are owned by the
    /// recount methods.
    async fn update_group(&mut self, group: &Group) -> Result<(), StoreError>;

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, StoreError>;

    /// Inserts or updates the single membership row for (group, user).
    async fn save_membership(&mut self, membership: &GroupMembership) -> Result<(), StoreError>;

    async fn count_active_admins(&mut self, group_id: Uuid) -> Result<i64, StoreError>;

    async fn find_join_request(
        &mut self,
        request_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError>;

    async fn find_pending_join_request(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError>;

    /// Inserts or updates by id. A second pending request for the same
    /// (group, user) is a `UniqueViolation`.
    async fn save_join_request(&mut self, request: &GroupJoinRequest) -> Result<(), StoreError>;

    async fn find_invitation(
        &mut self,
        invitation_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError>;

    async fn find_invitation_for(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError>;

    /// Inserts or updates by id. A second invitation for the same
    /// (group, invited user) is a `UniqueViolation`.
    async fn save_invitation(&mut self, invitation: &GroupInvitation) -> Result<(), StoreError>;

    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<GroupPost>, StoreError>;

    async fn save_post(&mut self, post: &GroupPost) -> Result<(), StoreError>;

    async fn find_event(&mut self, event_id: Uuid) -> Result<Option<GroupEvent>, StoreError>;

    async fn save_event(&mut self, event: &GroupEvent) -> Result<(), StoreError>;

    async fn delete_event(&mut self, event_id: Uuid) -> Result<bool, StoreError>;

    /// A second reaction by the same user on the same target is a
    /// `UniqueViolation`.
    async fn insert_reaction(&mut self, reaction: &Reaction) -> Result<(), StoreError>;

    async fn delete_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> Result<bool, StoreError>;

    /// Sets `member_count` to the number of active memberships and returns it.
    async fn recount_members(&mut self, group_id: Uuid) -> Result<i32, StoreError>;

    /// Sets `post_count` to the number of approved, non-deleted posts and
    /// returns it.
    async fn recount_posts(&mut self, group_id: Uuid) -> Result<i32, StoreError>;

    /// Sets a group post's `likes_count` to its number of reactions and
    /// returns it.
    async fn recount_post_likes(&mut self, post_id: Uuid) -> Result<i32, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
