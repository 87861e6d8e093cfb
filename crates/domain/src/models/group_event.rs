//! Group event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::GroupError;

/// An event organized within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupEvent {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_all_day: bool,
    pub max_attendees: Option<i32>,
    pub require_rsvp: bool,
    pub is_public: bool,
    pub attendee_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupEvent {
    pub fn new(group_id: Uuid, created_by: Uuid, request: CreateGroupEventRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            created_by,
            title: request.title,
            description: request.description,
            location: request.location,
            start_at: request.start_at,
            end_at: request.end_at,
            is_all_day: request.is_all_day.unwrap_or(false),
            max_attendees: request.max_attendees,
            require_rsvp: request.require_rsvp.unwrap_or(false),
            is_public: request.is_public.unwrap_or(false),
            attendee_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks that the event ends after it starts.
    pub fn check_schedule(&self) -> Result<(), GroupError> {
        if self.start_at >= self.end_at {
            return Err(GroupError::validation("Event must end after it starts"));
        }
        Ok(())
    }
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupEventRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_all_day: Option<bool>,

    #[validate(range(min = 1, message = "Max attendees must be at least 1"))]
    pub max_attendees: Option<i32>,

    pub require_rsvp: Option<bool>,
    pub is_public: Option<bool>,
}

/// Request payload for editing an event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupEventRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub is_all_day: Option<bool>,

    #[validate(range(min = 1, message = "Max attendees must be at least 1"))]
    pub max_attendees: Option<i32>,

    pub require_rsvp: Option<bool>,
    pub is_public: Option<bool>,
}

impl UpdateGroupEventRequest {
    pub fn apply_to(&self, event: &mut GroupEvent) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(start_at) = self.start_at {
            event.start_at = start_at;
        }
        if let Some(end_at) = self.end_at {
            event.end_at = end_at;
        }
        if let Some(is_all_day) = self.is_all_day {
            event.is_all_day = is_all_day;
        }
        if let Some(max_attendees) = self.max_attendees {
            event.max_attendees = Some(max_attendees);
        }
        if let Some(require_rsvp) = self.require_rsvp {
            event.require_rsvp = require_rsvp;
        }
        if let Some(is_public) = self.is_public {
            event.is_public = is_public;
        }
        event.updated_at = Utc::now();
    }
}

/// Query parameters for listing a group's events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsQuery {
    /// Only events that have not ended yet.
    pub upcoming: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(start_offset_hours: i64, end_offset_hours: i64) -> CreateGroupEventRequest {
        let now = Utc::now();
        CreateGroupEventRequest {
            title: "Parish picnic".to_string(),
            description: None,
            location: Some("Church garden".to_string()),
            start_at: now + Duration::hours(start_offset_hours),
            end_at: now + Duration::hours(end_offset_hours),
            is_all_day: None,
            max_attendees: None,
            require_rsvp: None,
            is_public: Some(true),
        }
    }

    #[test]
    fn test_schedule_must_end_after_start() {
        let event = GroupEvent::new(Uuid::new_v4(), Uuid::new_v4(), request(1, 3));
        assert!(event.check_schedule().is_ok());
        assert!(event.is_public);
        assert_eq!(event.attendee_count, 0);

        let inverted = GroupEvent::new(Uuid::new_v4(), Uuid::new_v4(), request(3, 1));
        assert!(matches!(
            inverted.check_schedule(),
            Err(GroupError::Validation(_))
        ));
    }

    #[test]
    fn test_update_can_break_schedule() {
        let mut event = GroupEvent::new(Uuid::new_v4(), Uuid::new_v4(), request(1, 3));
        let update = UpdateGroupEventRequest {
            end_at: Some(event.start_at),
            ..Default::default()
        };
        update.apply_to(&mut event);
        assert!(event.check_schedule().is_err());
    }

    #[test]
    fn test_max_attendees_validation() {
        let mut req = request(1, 2);
        req.max_attendees = Some(0);
        assert!(req.validate().is_err());
    }
}
