//! In-memory group store for tests.
//!
//! Implements the same store traits as the PostgreSQL store. A transaction
//! holds the store-wide lock from `begin` until it is committed or dropped and
//! works on a copy of the state, so uncommitted writes are discarded exactly
//! like a rolled back database transaction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Group, GroupEvent, GroupInvitation, GroupJoinRequest, GroupMembership, GroupPost,
    GroupPrivacy, GroupRole, GroupType, Reaction, ReactionTarget, User,
};
use crate::services::counters::{count_active_members, count_visible_posts};
use crate::services::store::{GroupStore, GroupTransaction};

#[derive(Debug, Clone, Default)]
struct State {
    parishes: HashSet<Uuid>,
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    memberships: HashMap<(Uuid, Uuid), GroupMembership>,
    join_requests: HashMap<Uuid, GroupJoinRequest>,
    invitations: HashMap<Uuid, GroupInvitation>,
    posts: HashMap<Uuid, GroupPost>,
    events: HashMap<Uuid, GroupEvent>,
    reactions: HashMap<(Uuid, ReactionTarget), Reaction>,
}

/// A [`GroupStore`] backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_parish(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.parishes.insert(id);
        id
    }

    pub async fn add_user(&self, parish_id: Option<Uuid>) -> User {
        self.insert_user(parish_id, false).await
    }

    pub async fn add_superuser(&self) -> User {
        self.insert_user(None, true).await
    }

    async fn insert_user(&self, parish_id: Option<Uuid>, is_superuser: bool) -> User {
        let id = Uuid::new_v4();
        let user = User {
            id,
            email: format!("user-{}@example.org", id.simple()),
            display_name: format!("User {}", &id.simple().to_string()[..8]),
            parish_id,
            is_superuser,
            is_active: true,
            created_at: Utc::now(),
        };
        self.state.lock().await.users.insert(id, user.clone());
        user
    }

    pub async fn deactivate_user(&self, user_id: Uuid) {
        if let Some(user) = self.state.lock().await.users.get_mut(&user_id) {
            user.is_active = false;
        }
    }

    pub async fn group(&self, group_id: Uuid) -> Option<Group> {
        self.state.lock().await.groups.get(&group_id).cloned()
    }

    pub async fn membership(&self, group_id: Uuid, user_id: Uuid) -> Option<GroupMembership> {
        self.state
            .lock()
            .await
            .memberships
            .get(&(group_id, user_id))
            .cloned()
    }

    /// All membership rows of a group, active or not.
    pub async fn memberships(&self, group_id: Uuid) -> Vec<GroupMembership> {
        self.state
            .lock()
            .await
            .memberships
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect()
    }

    pub async fn pending_requests(&self, group_id: Uuid) -> Vec<GroupJoinRequest> {
        self.state
            .lock()
            .await
            .join_requests
            .values()
            .filter(|r| r.group_id == group_id && r.is_pending())
            .cloned()
            .collect()
    }

    pub async fn invitation(&self, invitation_id: Uuid) -> Option<GroupInvitation> {
        self.state
            .lock()
            .await
            .invitations
            .get(&invitation_id)
            .cloned()
    }

    pub async fn set_invitation_expiry(&self, invitation_id: Uuid, expires_at: DateTime<Utc>) {
        if let Some(invitation) = self.state.lock().await.invitations.get_mut(&invitation_id) {
            invitation.expires_at = expires_at;
        }
    }

    pub async fn post(&self, post_id: Uuid) -> Option<GroupPost> {
        self.state.lock().await.posts.get(&post_id).cloned()
    }

    /// All posts of a group, including deleted and unapproved ones.
    pub async fn posts(&self, group_id: Uuid) -> Vec<GroupPost> {
        self.state
            .lock()
            .await
            .posts
            .values()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect()
    }

    pub async fn event(&self, event_id: Uuid) -> Option<GroupEvent> {
        self.state.lock().await.events.get(&event_id).cloned()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn begin(&self) -> Result<Box<dyn GroupTransaction>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<State>,
    working: State,
}

impl InMemoryTransaction {
    fn group_mut(&mut self, group_id: Uuid) -> Result<&mut Group, StoreError> {
        self.working
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| StoreError::Unavailable(format!("group {} missing", group_id)))
    }
}

#[async_trait]
impl GroupTransaction for InMemoryTransaction {
    async fn parish_exists(&mut self, parish_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.working.parishes.contains(&parish_id))
    }

    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn lock_group(&mut self, group_id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.working.groups.get(&group_id).cloned())
    }

    async fn insert_group(&mut self, group: &Group) -> Result<(), StoreError> {
        if self.working.groups.contains_key(&group.id) {
            return Err(StoreError::UniqueViolation("groups_pkey".to_string()));
        }
        self.working.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn update_group(&mut self, group: &Group) -> Result<(), StoreError> {
        let stored = self.group_mut(group.id)?;
        let (member_count, post_count) = (stored.member_count, stored.post_count);
        *stored = Group {
            member_count,
            post_count,
            ..group.clone()
        };
        Ok(())
    }

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, StoreError> {
        Ok(self.working.memberships.get(&(group_id, user_id)).cloned())
    }

    async fn save_membership(&mut self, membership: &GroupMembership) -> Result<(), StoreError> {
        self.working.memberships.insert(
            (membership.group_id, membership.user_id),
            membership.clone(),
        );
        Ok(())
    }

    async fn count_active_admins(&mut self, group_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .working
            .memberships
            .values()
            .filter(|m| m.group_id == group_id && m.active_role() == Some(GroupRole::Admin))
            .count() as i64)
    }

    async fn find_join_request(
        &mut self,
        request_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError> {
        Ok(self.working.join_requests.get(&request_id).cloned())
    }

    async fn find_pending_join_request(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError> {
        Ok(self
            .working
            .join_requests
            .values()
            .find(|r| r.group_id == group_id && r.user_id == user_id && r.is_pending())
            .cloned())
    }

    async fn save_join_request(&mut self, request: &GroupJoinRequest) -> Result<(), StoreError> {
        let duplicate = request.is_pending()
            && self.working.join_requests.values().any(|r| {
                r.id != request.id
                    && r.group_id == request.group_id
                    && r.user_id == request.user_id
                    && r.is_pending()
            });
        if duplicate {
            return Err(StoreError::UniqueViolation(
                "group_join_requests_pending_unique".to_string(),
            ));
        }
        self.working.join_requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_invitation(
        &mut self,
        invitation_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError> {
        Ok(self.working.invitations.get(&invitation_id).cloned())
    }

    async fn find_invitation_for(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError> {
        Ok(self
            .working
            .invitations
            .values()
            .find(|i| i.group_id == group_id && i.invited_user_id == user_id)
            .cloned())
    }

    async fn save_invitation(&mut self, invitation: &GroupInvitation) -> Result<(), StoreError> {
        let duplicate = self.working.invitations.values().any(|i| {
            i.id != invitation.id
                && i.group_id == invitation.group_id
                && i.invited_user_id == invitation.invited_user_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(
                "group_invitations_group_id_invited_user_id_key".to_string(),
            ));
        }
        self.working
            .invitations
            .insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<GroupPost>, StoreError> {
        Ok(self.working.posts.get(&post_id).cloned())
    }

    async fn save_post(&mut self, post: &GroupPost) -> Result<(), StoreError> {
        let likes_count = self
            .working
            .posts
            .get(&post.id)
            .map(|p| p.likes_count)
            .unwrap_or(0);
        self.working.posts.insert(
            post.id,
            GroupPost {
                likes_count,
                ..post.clone()
            },
        );
        Ok(())
    }

    async fn find_event(&mut self, event_id: Uuid) -> Result<Option<GroupEvent>, StoreError> {
        Ok(self.working.events.get(&event_id).cloned())
    }

    async fn save_event(&mut self, event: &GroupEvent) -> Result<(), StoreError> {
        self.working.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&mut self, event_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.working.events.remove(&event_id).is_some())
    }

    async fn insert_reaction(&mut self, reaction: &Reaction) -> Result<(), StoreError> {
        let key = (reaction.user_id, reaction.target);
        if self.working.reactions.contains_key(&key) {
            return Err(StoreError::UniqueViolation(
                "reactions_user_id_target_kind_target_id_key".to_string(),
            ));
        }
        self.working.reactions.insert(key, reaction.clone());
        Ok(())
    }

    async fn delete_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> Result<bool, StoreError> {
        Ok(self.working.reactions.remove(&(user_id, target)).is_some())
    }

    async fn recount_members(&mut self, group_id: Uuid) -> Result<i32, StoreError> {
        let count = count_active_members(
            self.working
                .memberships
                .values()
                .filter(|m| m.group_id == group_id),
        );
        self.group_mut(group_id)?.member_count = count;
        Ok(count)
    }

    async fn recount_posts(&mut self, group_id: Uuid) -> Result<i32, StoreError> {
        let count = count_visible_posts(self.working.posts.values().filter(|p| p.group_id == group_id));
        self.group_mut(group_id)?.post_count = count;
        Ok(count)
    }

    async fn recount_post_likes(&mut self, post_id: Uuid) -> Result<i32, StoreError> {
        let target = ReactionTarget::GroupPost(post_id);
        let count = self
            .working
            .reactions
            .keys()
            .filter(|(_, t)| *t == target)
            .count() as i32;
        let post = self
            .working
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| StoreError::Unavailable(format!("post {} missing", post_id)))?;
        post.likes_count = count;
        Ok(count)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

/// A standalone active group for rule tests that need no store.
pub fn sample_group(parish_id: Uuid, privacy: GroupPrivacy) -> Group {
    let now = Utc::now();
    Group {
        id: Uuid::new_v4(),
        parish_id,
        name: "Sample Group".to_string(),
        description: "A group used in tests".to_string(),
        group_type: GroupType::Interest,
        privacy,
        created_by: Uuid::new_v4(),
        is_active: true,
        is_featured: false,
        allow_member_posts: true,
        require_approval: false,
        max_members: None,
        member_count: 1,
        post_count: 0,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryGroupStore::new();
        let parish = store.add_parish().await;
        let group = sample_group(parish, GroupPrivacy::Public);

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_group(&group).await.unwrap();
        }
        assert!(store.group(group.id).await.is_none());

        let mut tx = store.begin().await.unwrap();
        tx.insert_group(&group).await.unwrap();
        tx.commit().await.unwrap();
        assert!(store.group(group.id).await.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_rejected() {
        let store = InMemoryGroupStore::new();
        let (group_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.save_join_request(&GroupJoinRequest::new(group_id, user_id, None))
            .await
            .unwrap();
        let err = tx
            .save_join_request(&GroupJoinRequest::new(group_id, user_id, None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_update_group_preserves_counters() {
        let store = InMemoryGroupStore::new();
        let mut group = sample_group(Uuid::new_v4(), GroupPrivacy::Public);

        let mut tx = store.begin().await.unwrap();
        tx.insert_group(&group).await.unwrap();
        group.member_count = 99;
        group.name = "Renamed".to_string();
        tx.update_group(&group).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.group(group.id).await.unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.member_count, 1);
    }
}
