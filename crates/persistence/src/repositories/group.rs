//! Group repository for read-side listings.
//!
//! Every listing applies the group visibility rules in SQL so that hidden
//! groups never leave the database.

use domain::models::Actor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::group::GROUP_COLUMNS;
use crate::entities::{GroupEntity, GroupPrivacyDb, GroupTypeDb};
use crate::metrics::QueryTimer;

/// Visibility predicate over `groups g`.
///
/// Binds: `$1` actor id, `$2` actor parish (nullable), `$3` actor is superuser.
pub(crate) const VISIBLE_TO_ACTOR: &str = r#"
    g.is_active = true
    AND (
        $3
        OR g.privacy = 'public'
        OR (g.privacy = 'parish_only' AND g.parish_id = $2)
        OR (
            g.privacy IN ('private', 'invite_only')
            AND EXISTS (
                SELECT 1 FROM group_memberships vm
                WHERE vm.group_id = g.id AND vm.user_id = $1 AND vm.is_active = true
            )
        )
    )
"#;

/// Optional filters for the group listing.
#[derive(Debug, Clone, Default)]
pub struct GroupListFilter {
    pub group_type: Option<GroupTypeDb>,
    pub privacy: Option<GroupPrivacyDb>,
    pub parish_id: Option<Uuid>,
    pub featured: Option<bool>,
    /// Already escaped `ILIKE` pattern, see `shared::validation::contains_pattern`.
    pub search_pattern: Option<String>,
}

const LIST_FILTERS: &str = r#"
    AND ($4::group_type IS NULL OR g.group_type = $4)
    AND ($5::group_privacy IS NULL OR g.privacy = $5)
    AND ($6::uuid IS NULL OR g.parish_id = $6)
    AND ($7::boolean IS NULL OR g.is_featured = $7)
    AND ($8::text IS NULL OR g.name ILIKE $8 OR g.description ILIKE $8)
"#;

/// Repository for group read operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active group by ID.
    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let sql = format!(
            "SELECT {} FROM groups g WHERE g.id = $1 AND g.is_active = true",
            GROUP_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// List groups visible to the actor, newest first.
    pub async fn list_visible(
        &self,
        actor: &Actor,
        filter: &GroupListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_visible_groups");
        let sql = format!(
            "SELECT {} FROM groups g WHERE {} {} ORDER BY g.created_at DESC LIMIT $9 OFFSET $10",
            GROUP_COLUMNS, VISIBLE_TO_ACTOR, LIST_FILTERS
        );
        let result = sqlx::query_as::<_, GroupEntity>(&sql)
            .bind(actor.id)
            .bind(actor.parish_id)
            .bind(actor.is_superuser)
            .bind(filter.group_type)
            .bind(filter.privacy)
            .bind(filter.parish_id)
            .bind(filter.featured)
            .bind(filter.search_pattern.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count groups visible to the actor under the same filters.
    pub async fn count_visible(
        &self,
        actor: &Actor,
        filter: &GroupListFilter,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_visible_groups");
        let sql = format!(
            "SELECT COUNT(*) FROM groups g WHERE {} {}",
            VISIBLE_TO_ACTOR, LIST_FILTERS
        );
        let result = sqlx::query_scalar::<_, i64>(&sql)
            .bind(actor.id)
            .bind(actor.parish_id)
            .bind(actor.is_superuser)
            .bind(filter.group_type)
            .bind(filter.privacy)
            .bind(filter.parish_id)
            .bind(filter.featured)
            .bind(filter.search_pattern.as_deref())
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Featured groups visible to the actor, most members first.
    pub async fn list_featured(
        &self,
        actor: &Actor,
        limit: i64,
    ) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_featured_groups");
        let sql = format!(
            "SELECT {} FROM groups g WHERE {} AND g.is_featured = true \
             ORDER BY g.member_count DESC, g.created_at DESC LIMIT $4",
            GROUP_COLUMNS, VISIBLE_TO_ACTOR
        );
        let result = sqlx::query_as::<_, GroupEntity>(&sql)
            .bind(actor.id)
            .bind(actor.parish_id)
            .bind(actor.is_superuser)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Active groups the user is an active member of, most recently joined first.
    pub async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups_for_member");
        let sql = format!(
            "SELECT {} FROM groups g \
             JOIN group_memberships gm ON gm.group_id = g.id \
             WHERE gm.user_id = $1 AND gm.is_active = true AND g.is_active = true \
             ORDER BY gm.joined_at DESC",
            GROUP_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupEntity>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }
}
