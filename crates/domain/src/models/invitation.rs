//! Group invitation models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::GroupError;

/// Default invitation lifetime in days.
pub const DEFAULT_INVITATION_EXPIRY_DAYS: i64 = 30;

/// Longest invitation lifetime the service accepts.
pub const MAX_INVITATION_EXPIRY_DAYS: i64 = 365;

/// An admin or moderator initiated, time-limited offer to join a group.
///
/// Pending means neither `is_accepted` nor `is_declined` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInvitation {
    pub id: Uuid,
    pub group_id: Uuid,
    pub invited_user_id: Uuid,
    pub invited_by: Uuid,
    pub message: Option<String>,
    pub is_accepted: bool,
    pub is_declined: bool,
    pub expires_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl GroupInvitation {
    pub fn new(
        group_id: Uuid,
        invited_user_id: Uuid,
        invited_by: Uuid,
        message: Option<String>,
        expiry_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            invited_user_id,
            invited_by,
            message,
            is_accepted: false,
            is_declined: false,
            expires_at: now + Duration::days(expiry_days),
            responded_at: None,
            created_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.is_accepted && !self.is_declined
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Re-issues an unanswered, expired invitation.
    pub fn renew(&mut self, invited_by: Uuid, message: Option<String>, expiry_days: i64) {
        let now = Utc::now();
        self.invited_by = invited_by;
        self.message = message;
        self.expires_at = now + Duration::days(expiry_days);
        self.created_at = now;
    }

    pub fn accept(&mut self) {
        self.is_accepted = true;
        self.responded_at = Some(Utc::now());
    }

    pub fn decline(&mut self) {
        self.is_declined = true;
        self.responded_at = Some(Utc::now());
    }
}

/// Who an invitation is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteTarget {
    User(Uuid),
    Email(String),
}

/// Request payload for inviting a user. Exactly one of `user_id` or `email`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteUserRequest {
    pub user_id: Option<Uuid>,

    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: Option<String>,

    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
}

impl InviteUserRequest {
    pub fn target(&self) -> Result<InviteTarget, GroupError> {
        match (self.user_id, self.email.as_deref()) {
            (Some(user_id), None) => Ok(InviteTarget::User(user_id)),
            (None, Some(email)) => Ok(InviteTarget::Email(email.trim().to_lowercase())),
            _ => Err(GroupError::validation(
                "Provide exactly one of user_id or email",
            )),
        }
    }
}

/// Invitation as listed for its recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub invitation: GroupInvitation,
    pub group_name: String,
    pub is_pending: bool,
    pub is_expired: bool,
}

impl InvitationResponse {
    pub fn new(invitation: GroupInvitation, group_name: String, now: DateTime<Utc>) -> Self {
        Self {
            is_pending: invitation.is_pending(),
            is_expired: invitation.is_expired(now),
            invitation,
            group_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> GroupInvitation {
        GroupInvitation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            DEFAULT_INVITATION_EXPIRY_DAYS,
        )
    }

    #[test]
    fn test_pending_state_is_derived_from_flags() {
        let mut inv = invitation();
        assert!(inv.is_pending());

        inv.decline();
        assert!(!inv.is_pending());
        assert!(inv.responded_at.is_some());
    }

    #[test]
    fn test_expiry() {
        let mut inv = invitation();
        let now = Utc::now();
        assert!(!inv.is_expired(now));
        assert!(inv.is_expired(now + Duration::days(31)));

        inv.expires_at = now - Duration::seconds(1);
        assert!(inv.is_expired(now));

        inv.renew(Uuid::new_v4(), None, 7);
        assert!(!inv.is_expired(Utc::now()));
    }

    #[test]
    fn test_invite_target() {
        let by_user = InviteUserRequest {
            user_id: Some(Uuid::nil()),
            ..Default::default()
        };
        assert_eq!(by_user.target().unwrap(), InviteTarget::User(Uuid::nil()));

        let by_email = InviteUserRequest {
            email: Some(" Anna@Example.org ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            by_email.target().unwrap(),
            InviteTarget::Email("anna@example.org".to_string())
        );

        let neither = InviteUserRequest::default();
        assert!(matches!(neither.target(), Err(GroupError::Validation(_))));

        let both = InviteUserRequest {
            user_id: Some(Uuid::nil()),
            email: Some("a@example.org".to_string()),
            message: None,
        };
        assert!(both.target().is_err());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let request = InviteUserRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_flags() {
        let inv = invitation();
        let response = InvitationResponse::new(inv, "Choir".to_string(), Utc::now());
        assert!(response.is_pending);
        assert!(!response.is_expired);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["group_name"], "Choir");
        assert_eq!(json["is_accepted"], false);
    }
}
