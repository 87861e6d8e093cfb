//! Group event repository for read-side queries.

use chrono::{DateTime, Utc};
use domain::models::Actor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GroupEventEntity;
use crate::metrics::QueryTimer;
use crate::repositories::group::VISIBLE_TO_ACTOR;

const EVENT_COLUMNS: &str = "e.id, e.group_id, e.created_by, e.title, e.description, \
     e.location, e.start_at, e.end_at, e.is_all_day, e.max_attendees, e.require_rsvp, \
     e.is_public, e.attendee_count, e.created_at, e.updated_at";

/// Repository for group event read operations.
#[derive(Clone)]
pub struct GroupEventRepository {
    pool: PgPool,
}

impl GroupEventRepository {
    /// Creates a new GroupEventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<GroupEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_event");
        let sql = format!("SELECT {} FROM group_events e WHERE e.id = $1", EVENT_COLUMNS);
        let result = sqlx::query_as::<_, GroupEventEntity>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Events of a group by start time. With `ending_after` set, only events
    /// that have not ended by then.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        ending_after: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GroupEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_events");
        let sql = format!(
            "SELECT {} FROM group_events e \
             WHERE e.group_id = $1 AND ($2::timestamptz IS NULL OR e.end_at > $2) \
             ORDER BY e.start_at ASC LIMIT $3 OFFSET $4",
            EVENT_COLUMNS
        );
        let result = sqlx::query_as::<_, GroupEventEntity>(&sql)
            .bind(group_id)
            .bind(ending_after)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count events of a group under the same filter as [`Self::list_for_group`].
    pub async fn count_for_group(
        &self,
        group_id: Uuid,
        ending_after: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_group_events");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM group_events e
            WHERE e.group_id = $1 AND ($2::timestamptz IS NULL OR e.end_at > $2)
            "#,
        )
        .bind(group_id)
        .bind(ending_after)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Next events starting from `now` that the actor may see: public events
    /// of active groups, or any event of a group visible to the actor.
    pub async fn list_upcoming(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<GroupEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_upcoming_events");
        let sql = format!(
            "SELECT {} FROM group_events e JOIN groups g ON g.id = e.group_id \
             WHERE e.start_at >= $4 AND ((e.is_public = true AND g.is_active = true) OR ({})) \
             ORDER BY e.start_at ASC LIMIT $5",
            EVENT_COLUMNS, VISIBLE_TO_ACTOR
        );
        let result = sqlx::query_as::<_, GroupEventEntity>(&sql)
            .bind(actor.id)
            .bind(actor.parish_id)
            .bind(actor.is_superuser)
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }
}
