//! Posts, likes and events inside a group.
//!
//! Mutations follow the same transactional pattern as the membership
//! lifecycle and keep `post_count` and `likes_count` in sync.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::GroupError;
use crate::models::group_event::{CreateGroupEventRequest, UpdateGroupEventRequest};
use crate::models::group_post::{CreateGroupPostRequest, UpdateGroupPostRequest};
use crate::models::{
    Actor, Group, GroupEvent, GroupMembership, GroupPost, PostModeration, Reaction,
    ReactionTarget,
};
use crate::services::counters::CounterSynchronizer;
use crate::services::lifecycle::{ensure_visible, load_group};
use crate::services::permissions::{GroupAction, PermissionEvaluator};
use crate::services::store::{GroupStore, GroupTransaction};

/// Writes group posts, reactions and events.
#[derive(Clone)]
pub struct GroupContentService {
    store: Arc<dyn GroupStore>,
}

impl GroupContentService {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self { store }
    }

    pub async fn create_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request: CreateGroupPostRequest,
    ) -> Result<GroupPost, GroupError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let (mut group, membership) = open_group(&mut *tx, actor, group_id).await?;
        let evaluator = PermissionEvaluator::new(actor, &group, membership.as_ref());
        evaluator.authorize(GroupAction::CreatePost {
            announcement: request.is_announcement.unwrap_or(false),
        })?;

        let post = GroupPost::new(group_id, actor.id, request);
        tx.save_post(&post).await?;
        CounterSynchronizer::sync_posts(&mut *tx, &mut group).await?;
        tx.commit().await?;

        info!(
            group_id = %group_id,
            post_id = %post.id,
            author_id = %actor.id,
            post_count = group.post_count,
            "Group post created"
        );
        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        post_id: Uuid,
        request: UpdateGroupPostRequest,
    ) -> Result<GroupPost, GroupError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let (group, membership) = open_group(&mut *tx, actor, group_id).await?;
        let mut post = find_post(&mut *tx, group_id, post_id).await?;

        PermissionEvaluator::new(actor, &group, membership.as_ref()).authorize(
            GroupAction::EditPost {
                author_id: post.author_id,
            },
        )?;

        request.apply_to(&mut post);
        tx.save_post(&post).await?;
        tx.commit().await?;

        info!(group_id = %group_id, post_id = %post_id, "Group post updated");
        Ok(post)
    }

    /// Soft-deletes a post.
    pub async fn delete_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        post_id: Uuid,
    ) -> Result<(), GroupError> {
        let mut tx = self.store.begin().await?;
        let (mut group, membership) = open_group(&mut *tx, actor, group_id).await?;
        let mut post = find_post(&mut *tx, group_id, post_id).await?;

        PermissionEvaluator::new(actor, &group, membership.as_ref()).authorize(
            GroupAction::EditPost {
                author_id: post.author_id,
            },
        )?;

        post.is_deleted = true;
        post.updated_at = chrono::Utc::now();
        tx.save_post(&post).await?;
        CounterSynchronizer::sync_posts(&mut *tx, &mut group).await?;
        tx.commit().await?;

        info!(
            group_id = %group_id,
            post_id = %post_id,
            deleted_by = %actor.id,
            post_count = group.post_count,
            "Group post deleted"
        );
        Ok(())
    }

    /// Pins, unpins, approves, unapproves or announces a post.
    pub async fn moderate_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        post_id: Uuid,
        action: PostModeration,
    ) -> Result<GroupPost, GroupError> {
        let mut tx = self.store.begin().await?;
        let (mut group, membership) = open_group(&mut *tx, actor, group_id).await?;
        PermissionEvaluator::new(actor, &group, membership.as_ref())
            .authorize(GroupAction::ModeratePost)?;

        let mut post = find_post(&mut *tx, group_id, post_id).await?;
        action.apply_to(&mut post);
        tx.save_post(&post).await?;
        CounterSynchronizer::sync_posts(&mut *tx, &mut group).await?;
        tx.commit().await?;

        info!(
            group_id = %group_id,
            post_id = %post_id,
            action = action.as_str(),
            moderator_id = %actor.id,
            "Group post moderated"
        );
        Ok(post)
    }

    /// Adds the actor's like to a visible post.
    pub async fn like_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        post_id: Uuid,
    ) -> Result<GroupPost, GroupError> {
        let mut tx = self.store.begin().await?;
        open_group(&mut *tx, actor, group_id).await?;
        let mut post = find_post(&mut *tx, group_id, post_id).await?;
        if !post.is_visible() {
            return Err(GroupError::not_found("Post not found"));
        }

        let reaction = Reaction::new(actor.id, ReactionTarget::GroupPost(post_id));
        tx.insert_reaction(&reaction).await.map_err(|e| match GroupError::from(e) {
            GroupError::Conflict(_) => GroupError::conflict("You already like this post"),
            other => other,
        })?;
        CounterSynchronizer::sync_likes(&mut *tx, &mut post).await?;
        tx.commit().await?;

        info!(group_id = %group_id, post_id = %post_id, user_id = %actor.id, "Post liked");
        Ok(post)
    }

    /// Removes the actor's like from a post.
    pub async fn unlike_post(
        &self,
        actor: &Actor,
        group_id: Uuid,
        post_id: Uuid,
    ) -> Result<GroupPost, GroupError> {
        let mut tx = self.store.begin().await?;
        open_group(&mut *tx, actor, group_id).await?;
        let mut post = find_post(&mut *tx, group_id, post_id).await?;

        if !tx
            .delete_reaction(actor.id, ReactionTarget::GroupPost(post_id))
            .await?
        {
            return Err(GroupError::not_found("You have not liked this post"));
        }
        CounterSynchronizer::sync_likes(&mut *tx, &mut post).await?;
        tx.commit().await?;

        info!(group_id = %group_id, post_id = %post_id, user_id = %actor.id, "Post unliked");
        Ok(post)
    }

    pub async fn create_event(
        &self,
        actor: &Actor,
        group_id: Uuid,
        request: CreateGroupEventRequest,
    ) -> Result<GroupEvent, GroupError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let (group, membership) = open_group(&mut *tx, actor, group_id).await?;
        PermissionEvaluator::new(actor, &group, membership.as_ref())
            .authorize(GroupAction::CreateEvent)?;

        let event = GroupEvent::new(group_id, actor.id, request);
        event.check_schedule()?;
        tx.save_event(&event).await?;
        tx.commit().await?;

        info!(
            group_id = %group_id,
            event_id = %event.id,
            created_by = %actor.id,
            start_at = %event.start_at,
            "Group event created"
        );
        Ok(event)
    }

    pub async fn update_event(
        &self,
        actor: &Actor,
        group_id: Uuid,
        event_id: Uuid,
        request: UpdateGroupEventRequest,
    ) -> Result<GroupEvent, GroupError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let (group, membership) = open_group(&mut *tx, actor, group_id).await?;
        let mut event = find_event(&mut *tx, group_id, event_id).await?;

        PermissionEvaluator::new(actor, &group, membership.as_ref()).authorize(
            GroupAction::EditEvent {
                creator_id: event.created_by,
            },
        )?;

        request.apply_to(&mut event);
        event.check_schedule()?;
        tx.save_event(&event).await?;
        tx.commit().await?;

        info!(group_id = %group_id, event_id = %event_id, "Group event updated");
        Ok(event)
    }

    pub async fn delete_event(
        &self,
        actor: &Actor,
        group_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), GroupError> {
        let mut tx = self.store.begin().await?;
        let (group, membership) = open_group(&mut *tx, actor, group_id).await?;
        let event = find_event(&mut *tx, group_id, event_id).await?;

        PermissionEvaluator::new(actor, &group, membership.as_ref()).authorize(
            GroupAction::EditEvent {
                creator_id: event.created_by,
            },
        )?;

        tx.delete_event(event_id).await?;
        tx.commit().await?;

        info!(group_id = %group_id, event_id = %event_id, deleted_by = %actor.id, "Group event deleted");
        Ok(())
    }
}

/// Locks the group and loads the actor's membership, requiring visibility.
async fn open_group(
    tx: &mut dyn GroupTransaction,
    actor: &Actor,
    group_id: Uuid,
) -> Result<(Group, Option<GroupMembership>), GroupError> {
    let group = load_group(tx, group_id).await?;
    let membership = tx.find_membership(group_id, actor.id).await?;
    ensure_visible(&PermissionEvaluator::new(actor, &group, membership.as_ref()))?;
    Ok((group, membership))
}

async fn find_post(
    tx: &mut dyn GroupTransaction,
    group_id: Uuid,
    post_id: Uuid,
) -> Result<GroupPost, GroupError> {
    tx.find_post(post_id)
        .await?
        .filter(|p| p.group_id == group_id && !p.is_deleted)
        .ok_or_else(|| GroupError::not_found("Post not found"))
}

async fn find_event(
    tx: &mut dyn GroupTransaction,
    group_id: Uuid,
    event_id: Uuid,
) -> Result<GroupEvent, GroupError> {
    tx.find_event(event_id)
        .await?
        .filter(|e| e.group_id == group_id)
        .ok_or_else(|| GroupError::not_found("Event not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::CreateGroupRequest;
    use crate::models::User;
    use crate::services::counters::count_visible_posts;
    use crate::services::lifecycle::MembershipLifecycle;
    use crate::services::notification::MockInvitationNotifier;
    use crate::testing::InMemoryGroupStore;
    use chrono::{Duration, Utc};

    struct Fixture {
        store: InMemoryGroupStore,
        lifecycle: MembershipLifecycle,
        content: GroupContentService,
        parish: Uuid,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = InMemoryGroupStore::new();
            let shared: Arc<dyn GroupStore> = Arc::new(store.clone());
            let lifecycle =
                MembershipLifecycle::new(shared.clone(), Arc::new(MockInvitationNotifier::new()), 30);
            let content = GroupContentService::new(shared);
            let parish = store.add_parish().await;
            Self {
                store,
                lifecycle,
                content,
                parish,
            }
        }

        async fn user(&self) -> User {
            self.store.add_user(Some(self.parish)).await
        }

        async fn group(&self, admin: &User, allow_member_posts: bool) -> Group {
            self.lifecycle
                .create_group(
                    &admin.actor(),
                    CreateGroupRequest {
                        parish_id: None,
                        name: "Altar Servers".to_string(),
                        description: "Serving at Mass".to_string(),
                        group_type: None,
                        privacy: None,
                        require_approval: None,
                        allow_member_posts: Some(allow_member_posts),
                        max_members: None,
                    },
                )
                .await
                .unwrap()
        }

        async fn member(&self, group: &Group) -> User {
            let user = self.user().await;
            self.lifecycle
                .join(&user.actor(), group.id, None)
                .await
                .unwrap();
            user
        }

        async fn assert_post_count_consistent(&self, group_id: Uuid) {
            let group = self.store.group(group_id).await.unwrap();
            let posts = self.store.posts(group_id).await;
            assert_eq!(group.post_count, count_visible_posts(&posts));
        }
    }

    fn post_request(announcement: bool) -> CreateGroupPostRequest {
        CreateGroupPostRequest {
            title: Some("Schedule".to_string()),
            content: "Practice is on Saturday".to_string(),
            is_announcement: Some(announcement),
        }
    }

    fn event_request(start_hours: i64, end_hours: i64) -> CreateGroupEventRequest {
        let now = Utc::now();
        CreateGroupEventRequest {
            title: "Training".to_string(),
            description: None,
            location: None,
            start_at: now + Duration::hours(start_hours),
            end_at: now + Duration::hours(end_hours),
            is_all_day: None,
            max_attendees: None,
            require_rsvp: None,
            is_public: None,
        }
    }

    #[tokio::test]
    async fn test_member_creates_post_and_count_updates() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let member = fx.member(&group).await;

        let post = fx
            .content
            .create_post(&member.actor(), group.id, post_request(false))
            .await
            .unwrap();
        assert!(post.is_approved);
        assert_eq!(fx.store.group(group.id).await.unwrap().post_count, 1);
    }

    #[tokio::test]
    async fn test_non_member_cannot_post() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let outsider = fx.user().await;

        let err = fx
            .content
            .create_post(&outsider.actor(), group.id, post_request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));
        assert_eq!(fx.store.group(group.id).await.unwrap().post_count, 0);
    }

    #[tokio::test]
    async fn test_member_posts_disabled_and_announcements() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, false).await;
        let member = fx.member(&group).await;

        let err = fx
            .content
            .create_post(&member.actor(), group.id, post_request(false))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));

        let announcement = fx
            .content
            .create_post(&admin.actor(), group.id, post_request(true))
            .await
            .unwrap();
        assert!(announcement.is_announcement);
    }

    #[tokio::test]
    async fn test_member_cannot_announce() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let member = fx.member(&group).await;

        let err = fx
            .content
            .create_post(&member.actor(), group.id, post_request(true))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GroupError::forbidden("Only group admins and moderators can post announcements")
        );
    }

    #[tokio::test]
    async fn test_edit_and_delete_rules() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let author = fx.member(&group).await;
        let other = fx.member(&group).await;

        let post = fx
            .content
            .create_post(&author.actor(), group.id, post_request(false))
            .await
            .unwrap();

        let edit = UpdateGroupPostRequest {
            content: Some("Practice moved to Sunday".to_string()),
            ..Default::default()
        };
        let err = fx
            .content
            .update_post(&other.actor(), group.id, post.id, edit.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));

        let updated = fx
            .content
            .update_post(&author.actor(), group.id, post.id, edit)
            .await
            .unwrap();
        assert_eq!(updated.content, "Practice moved to Sunday");

        fx.content
            .delete_post(&admin.actor(), group.id, post.id)
            .await
            .unwrap();
        assert!(fx.store.post(post.id).await.unwrap().is_deleted);
        assert_eq!(fx.store.group(group.id).await.unwrap().post_count, 0);

        let err = fx
            .content
            .delete_post(&author.actor(), group.id, post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_moderation_keeps_post_count_in_sync() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let member = fx.member(&group).await;

        let first = fx
            .content
            .create_post(&member.actor(), group.id, post_request(false))
            .await
            .unwrap();
        let second = fx
            .content
            .create_post(&member.actor(), group.id, post_request(false))
            .await
            .unwrap();

        let err = fx
            .content
            .moderate_post(&member.actor(), group.id, first.id, PostModeration::Pin)
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));

        let pinned = fx
            .content
            .moderate_post(&admin.actor(), group.id, first.id, PostModeration::Pin)
            .await
            .unwrap();
        assert!(pinned.is_pinned);

        fx.content
            .moderate_post(&admin.actor(), group.id, second.id, PostModeration::Unapprove)
            .await
            .unwrap();
        assert_eq!(fx.store.group(group.id).await.unwrap().post_count, 1);
        fx.assert_post_count_consistent(group.id).await;

        fx.content
            .moderate_post(&admin.actor(), group.id, second.id, PostModeration::Approve)
            .await
            .unwrap();
        assert_eq!(fx.store.group(group.id).await.unwrap().post_count, 2);
        fx.assert_post_count_consistent(group.id).await;
    }

    #[tokio::test]
    async fn test_like_and_unlike() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let member = fx.member(&group).await;

        let post = fx
            .content
            .create_post(&admin.actor(), group.id, post_request(false))
            .await
            .unwrap();

        let liked = fx
            .content
            .like_post(&member.actor(), group.id, post.id)
            .await
            .unwrap();
        assert_eq!(liked.likes_count, 1);

        let err = fx
            .content
            .like_post(&member.actor(), group.id, post.id)
            .await
            .unwrap_err();
        assert_eq!(err, GroupError::conflict("You already like this post"));

        fx.content
            .like_post(&admin.actor(), group.id, post.id)
            .await
            .unwrap();
        assert_eq!(fx.store.post(post.id).await.unwrap().likes_count, 2);

        let unliked = fx
            .content
            .unlike_post(&member.actor(), group.id, post.id)
            .await
            .unwrap();
        assert_eq!(unliked.likes_count, 1);

        let err = fx
            .content
            .unlike_post(&member.actor(), group.id, post.id)
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cannot_like_unapproved_post() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;

        let post = fx
            .content
            .create_post(&admin.actor(), group.id, post_request(false))
            .await
            .unwrap();
        fx.content
            .moderate_post(&admin.actor(), group.id, post.id, PostModeration::Unapprove)
            .await
            .unwrap();

        let err = fx
            .content
            .like_post(&admin.actor(), group.id, post.id)
            .await
            .unwrap_err();
        assert_eq!(err, GroupError::not_found("Post not found"));
    }

    #[tokio::test]
    async fn test_event_lifecycle() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, false).await;
        let member = fx.member(&group).await;

        let err = fx
            .content
            .create_event(&member.actor(), group.id, event_request(1, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));

        let err = fx
            .content
            .create_event(&admin.actor(), group.id, event_request(2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Validation(_)));

        let event = fx
            .content
            .create_event(&admin.actor(), group.id, event_request(1, 2))
            .await
            .unwrap();

        let err = fx
            .content
            .update_event(
                &member.actor(),
                group.id,
                event.id,
                UpdateGroupEventRequest {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::PermissionDenied(_)));

        let err = fx
            .content
            .update_event(
                &admin.actor(),
                group.id,
                event.id,
                UpdateGroupEventRequest {
                    end_at: Some(event.start_at - Duration::minutes(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::Validation(_)));

        fx.content
            .delete_event(&admin.actor(), group.id, event.id)
            .await
            .unwrap();
        assert!(fx.store.event(event.id).await.is_none());
    }

    #[tokio::test]
    async fn test_member_creates_event_when_member_posts_allowed() {
        let fx = Fixture::new().await;
        let admin = fx.user().await;
        let group = fx.group(&admin, true).await;
        let member = fx.member(&group).await;

        let event = fx
            .content
            .create_event(&member.actor(), group.id, event_request(24, 26))
            .await
            .unwrap();
        assert_eq!(event.created_by, member.id);

        let updated = fx
            .content
            .update_event(
                &member.actor(),
                group.id,
                event.id,
                UpdateGroupEventRequest {
                    location: Some("Parish hall".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Parish hall"));
    }
}
