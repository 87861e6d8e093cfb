//! PostgreSQL implementation of the domain group store.
//!
//! Each [`PgGroupTransaction`] wraps one database transaction. `lock_group`
//! takes `SELECT ... FOR UPDATE` on the group row, which serializes every
//! lifecycle and content mutation on the same group. Dropping the
//! transaction without committing rolls it back.

use async_trait::async_trait;
use domain::models::{
    Group, GroupEvent, GroupInvitation, GroupJoinRequest, GroupMembership, GroupPost, Reaction,
    ReactionTarget, User,
};
use domain::services::{GroupStore, GroupTransaction};
use domain::StoreError;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::error;
use uuid::Uuid;

use crate::entities::{
    GroupEntity, GroupEventEntity, GroupInvitationEntity, GroupJoinRequestEntity,
    GroupMembershipEntity, GroupPostEntity, GroupPrivacyDb, GroupRoleDb, GroupTypeDb,
    JoinRequestStatusDb, ReactionTargetKindDb, UserEntity,
};
use crate::metrics::QueryTimer;

/// Maps a database error into the domain store taxonomy.
///
/// Unique violations keep the constraint name so callers can tell which
/// invariant was hit.
pub fn map_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(
                db_err.constraint().unwrap_or("unique").to_string(),
            );
        }
    }
    error!(error = %err, "Group store query failed");
    StoreError::Unavailable(err.to_string())
}

/// Group store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgGroupStore {
    pool: PgPool,
}

impl PgGroupStore {
    /// Creates a new PgGroupStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for PgGroupStore {
    async fn begin(&self) -> Result<Box<dyn GroupTransaction>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_store_error)?;
        Ok(Box::new(PgGroupTransaction { tx }))
    }
}

/// One open database transaction.
pub struct PgGroupTransaction {
    tx: Transaction<'static, Postgres>,
}

const MEMBERSHIP_COLUMNS: &str =
    "id, group_id, user_id, role, is_active, notifications_enabled, joined_at, updated_at";

const JOIN_REQUEST_COLUMNS: &str =
    "id, group_id, user_id, message, status, processed_by, processed_at, admin_notes, created_at";

const INVITATION_COLUMNS: &str = "id, group_id, invited_user_id, invited_by, message, \
     is_accepted, is_declined, expires_at, responded_at, created_at";

const POST_COLUMNS: &str = "id, group_id, author_id, title, content, is_announcement, \
     is_pinned, is_approved, is_deleted, likes_count, published_at, updated_at";

const EVENT_COLUMNS: &str = "id, group_id, created_by, title, description, location, start_at, \
     end_at, is_all_day, max_attendees, require_rsvp, is_public, attendee_count, created_at, \
     updated_at";

#[async_trait]
impl GroupTransaction for PgGroupTransaction {
    async fn parish_exists(&mut self, parish_id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("parish_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM parishes WHERE id = $1 AND is_active = true)",
        )
        .bind(parish_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(map_store_error)
    }

    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let timer = QueryTimer::new("store_find_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, display_name, parish_id, is_superuser, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        let timer = QueryTimer::new("store_find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, display_name, parish_id, is_superuser, is_active, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn lock_group(&mut self, group_id: Uuid) -> Result<Option<Group>, StoreError> {
        let timer = QueryTimer::new("lock_group");
        let sql = format!(
            "SELECT {} FROM groups g WHERE g.id = $1 FOR UPDATE",
            crate::entities::group::GROUP_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupEntity>(&sql)
            .bind(group_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn insert_group(&mut self, group: &Group) -> Result<(), StoreError> {
        let timer = QueryTimer::new("insert_group");
        let result = sqlx::query(
            r#"
            INSERT INTO groups (
                id, parish_id, name, description, group_type, privacy, created_by,
                is_active, is_featured, allow_member_posts, require_approval, max_members,
                member_count, post_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(group.id)
        .bind(group.parish_id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(GroupTypeDb::from(group.group_type))
        .bind(GroupPrivacyDb::from(group.privacy))
        .bind(group.created_by)
        .bind(group.is_active)
        .bind(group.is_featured)
        .bind(group.allow_member_posts)
        .bind(group.require_approval)
        .bind(group.max_members)
        .bind(group.member_count)
        .bind(group.post_count)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn update_group(&mut self, group: &Group) -> Result<(), StoreError> {
        let timer = QueryTimer::new("update_group");
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET name = $2,
                description = $3,
                group_type = $4,
                privacy = $5,
                is_active = $6,
                is_featured = $7,
                allow_member_posts = $8,
                require_approval = $9,
                max_members = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(GroupTypeDb::from(group.group_type))
        .bind(GroupPrivacyDb::from(group.privacy))
        .bind(group.is_active)
        .bind(group.is_featured)
        .bind(group.allow_member_posts)
        .bind(group.require_approval)
        .bind(group.max_members)
        .bind(group.updated_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>, StoreError> {
        let timer = QueryTimer::new("store_find_membership");
        let sql = format!(
            "SELECT {} FROM group_memberships WHERE group_id = $1 AND user_id = $2",
            MEMBERSHIP_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupMembershipEntity>(&sql)
            .bind(group_id)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn save_membership(&mut self, membership: &GroupMembership) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_membership");
        let result = sqlx::query(
            r#"
            INSERT INTO group_memberships (
                id, group_id, user_id, role, is_active, notifications_enabled, joined_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (group_id, user_id) DO UPDATE
            SET role = EXCLUDED.role,
                is_active = EXCLUDED.is_active,
                notifications_enabled = EXCLUDED.notifications_enabled,
                joined_at = EXCLUDED.joined_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(membership.id)
        .bind(membership.group_id)
        .bind(membership.user_id)
        .bind(GroupRoleDb::from(membership.role))
        .bind(membership.is_active)
        .bind(membership.notifications_enabled)
        .bind(membership.joined_at)
        .bind(membership.updated_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn count_active_admins(&mut self, group_id: Uuid) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("count_active_admins");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM group_memberships
            WHERE group_id = $1 AND is_active = true AND role = 'admin'
            "#,
        )
        .bind(group_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(map_store_error)
    }

    async fn find_join_request(
        &mut self,
        request_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError> {
        let timer = QueryTimer::new("store_find_join_request");
        let sql = format!(
            "SELECT {} FROM group_join_requests WHERE id = $1",
            JOIN_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupJoinRequestEntity>(&sql)
            .bind(request_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn find_pending_join_request(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupJoinRequest>, StoreError> {
        let timer = QueryTimer::new("store_find_pending_join_request");
        let sql = format!(
            "SELECT {} FROM group_join_requests \
             WHERE group_id = $1 AND user_id = $2 AND status = 'pending'",
            JOIN_REQUEST_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupJoinRequestEntity>(&sql)
            .bind(group_id)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn save_join_request(&mut self, request: &GroupJoinRequest) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_join_request");
        let result = sqlx::query(
            r#"
            INSERT INTO group_join_requests (
                id, group_id, user_id, message, status, processed_by, processed_at,
                admin_notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET message = EXCLUDED.message,
                status = EXCLUDED.status,
                processed_by = EXCLUDED.processed_by,
                processed_at = EXCLUDED.processed_at,
                admin_notes = EXCLUDED.admin_notes
            "#,
        )
        .bind(request.id)
        .bind(request.group_id)
        .bind(request.user_id)
        .bind(&request.message)
        .bind(JoinRequestStatusDb::from(request.status))
        .bind(request.processed_by)
        .bind(request.processed_at)
        .bind(&request.admin_notes)
        .bind(request.created_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn find_invitation(
        &mut self,
        invitation_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError> {
        let timer = QueryTimer::new("store_find_invitation");
        let sql = format!(
            "SELECT {} FROM group_invitations WHERE id = $1",
            INVITATION_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupInvitationEntity>(&sql)
            .bind(invitation_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn find_invitation_for(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupInvitation>, StoreError> {
        let timer = QueryTimer::new("store_find_invitation_for");
        let sql = format!(
            "SELECT {} FROM group_invitations WHERE group_id = $1 AND invited_user_id = $2",
            INVITATION_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupInvitationEntity>(&sql)
            .bind(group_id)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn save_invitation(&mut self, invitation: &GroupInvitation) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_invitation");
        let result = sqlx::query(
            r#"
            INSERT INTO group_invitations (
                id, group_id, invited_user_id, invited_by, message, is_accepted, is_declined,
                expires_at, responded_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET invited_by = EXCLUDED.invited_by,
                message = EXCLUDED.message,
                is_accepted = EXCLUDED.is_accepted,
                is_declined = EXCLUDED.is_declined,
                expires_at = EXCLUDED.expires_at,
                responded_at = EXCLUDED.responded_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(invitation.id)
        .bind(invitation.group_id)
        .bind(invitation.invited_user_id)
        .bind(invitation.invited_by)
        .bind(&invitation.message)
        .bind(invitation.is_accepted)
        .bind(invitation.is_declined)
        .bind(invitation.expires_at)
        .bind(invitation.responded_at)
        .bind(invitation.created_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<GroupPost>, StoreError> {
        let timer = QueryTimer::new("store_find_post");
        let sql = format!("SELECT {} FROM group_posts WHERE id = $1", POST_COLUMNS);
        let result = sqlx::query_as::<_, GroupPostEntity>(&sql)
            .bind(post_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn save_post(&mut self, post: &GroupPost) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_post");
        let result = sqlx::query(
            r#"
            INSERT INTO group_posts (
                id, group_id, author_id, title, content, is_announcement, is_pinned,
                is_approved, is_deleted, likes_count, published_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, $11)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                content = EXCLUDED.content,
                is_announcement = EXCLUDED.is_announcement,
                is_pinned = EXCLUDED.is_pinned,
                is_approved = EXCLUDED.is_approved,
                is_deleted = EXCLUDED.is_deleted,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(post.id)
        .bind(post.group_id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.is_announcement)
        .bind(post.is_pinned)
        .bind(post.is_approved)
        .bind(post.is_deleted)
        .bind(post.published_at)
        .bind(post.updated_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn find_event(&mut self, event_id: Uuid) -> Result<Option<GroupEvent>, StoreError> {
        let timer = QueryTimer::new("store_find_event");
        let sql = format!("SELECT {} FROM group_events WHERE id = $1", EVENT_COLUMNS);
        let result = sqlx::query_as::<_, GroupEventEntity>(&sql)
            .bind(event_id)
            .fetch_optional(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.map(Into::into))
    }

    async fn save_event(&mut self, event: &GroupEvent) -> Result<(), StoreError> {
        let timer = QueryTimer::new("save_event");
        let result = sqlx::query(
            r#"
            INSERT INTO group_events (
                id, group_id, created_by, title, description, location, start_at, end_at,
                is_all_day, max_attendees, require_rsvp, is_public, attendee_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                is_all_day = EXCLUDED.is_all_day,
                max_attendees = EXCLUDED.max_attendees,
                require_rsvp = EXCLUDED.require_rsvp,
                is_public = EXCLUDED.is_public,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(event.id)
        .bind(event.group_id)
        .bind(event.created_by)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.is_all_day)
        .bind(event.max_attendees)
        .bind(event.require_rsvp)
        .bind(event.is_public)
        .bind(event.attendee_count)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn delete_event(&mut self, event_id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM group_events WHERE id = $1")
            .bind(event_id)
            .execute(&mut *self.tx)
            .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.rows_affected() > 0)
    }

    async fn insert_reaction(&mut self, reaction: &Reaction) -> Result<(), StoreError> {
        let timer = QueryTimer::new("insert_reaction");
        let result = sqlx::query(
            r#"
            INSERT INTO reactions (id, user_id, target_kind, target_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reaction.id)
        .bind(reaction.user_id)
        .bind(ReactionTargetKindDb::from(reaction.target.kind()))
        .bind(reaction.target.id())
        .bind(reaction.created_at)
        .execute(&mut *self.tx)
        .await;
        timer.record();
        result.map(|_| ()).map_err(map_store_error)
    }

    async fn delete_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_reaction");
        let result = sqlx::query(
            "DELETE FROM reactions WHERE user_id = $1 AND target_kind = $2 AND target_id = $3",
        )
        .bind(user_id)
        .bind(ReactionTargetKindDb::from(target.kind()))
        .bind(target.id())
        .execute(&mut *self.tx)
        .await;
        timer.record();
        Ok(result.map_err(map_store_error)?.rows_affected() > 0)
    }

    async fn recount_members(&mut self, group_id: Uuid) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("recount_members");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE groups
            SET member_count = (
                SELECT COUNT(*) FROM group_memberships
                WHERE group_id = $1 AND is_active = true
            )
            WHERE id = $1
            RETURNING member_count
            "#,
        )
        .bind(group_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(map_store_error)
    }

    async fn recount_posts(&mut self, group_id: Uuid) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("recount_posts");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE groups
            SET post_count = (
                SELECT COUNT(*) FROM group_posts
                WHERE group_id = $1 AND is_approved = true AND is_deleted = false
            )
            WHERE id = $1
            RETURNING post_count
            "#,
        )
        .bind(group_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(map_store_error)
    }

    async fn recount_post_likes(&mut self, post_id: Uuid) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("recount_post_likes");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE group_posts
            SET likes_count = (
                SELECT COUNT(*) FROM reactions
                WHERE target_kind = 'group_post' AND target_id = $1
            )
            WHERE id = $1
            RETURNING likes_count
            "#,
        )
        .bind(post_id)
        .fetch_one(&mut *self.tx)
        .await;
        timer.record();
        result.map_err(map_store_error)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_store_error)
    }
}
