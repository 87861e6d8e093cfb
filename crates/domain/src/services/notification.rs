//! Invitation notifications.
//!
//! Provides the abstraction for telling users about invitations. Delivery is
//! best effort: failures are logged and never affect the membership change.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    InvitationCreated,
    InvitationAccepted,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::InvitationCreated => write!(f, "invitation_created"),
            NotificationType::InvitationAccepted => write!(f, "invitation_accepted"),
        }
    }
}

/// Payload describing an invitation event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationNotice {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub invitation_id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub invited_user_id: Uuid,
    pub invited_email: String,
    pub invited_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// Notifications are disabled.
    Skipped,
    /// Sending failed (but was non-blocking).
    Failed(String),
}

/// Sends invitation notifications.
#[async_trait::async_trait]
pub trait InvitationNotifier: Send + Sync {
    async fn invitation_created(&self, notice: &InvitationNotice) -> NotificationResult;

    async fn invitation_accepted(&self, notice: &InvitationNotice) -> NotificationResult;
}

/// Dispatches a notice on a background task. The outcome is only logged.
pub fn dispatch(notifier: Arc<dyn InvitationNotifier>, notice: InvitationNotice) {
    tokio::spawn(async move {
        let result = match notice.notification_type {
            NotificationType::InvitationCreated => notifier.invitation_created(&notice).await,
            NotificationType::InvitationAccepted => notifier.invitation_accepted(&notice).await,
        };
        if let NotificationResult::Failed(reason) = result {
            tracing::warn!(
                invitation_id = %notice.invitation_id,
                notification_type = %notice.notification_type,
                error = %reason,
                "Invitation notification failed"
            );
        }
    });
}

/// Mock notifier for development and testing.
///
/// Records notices instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockInvitationNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<InvitationNotice>>>,
}

impl MockInvitationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notices recorded so far.
    pub fn sent(&self) -> Vec<InvitationNotice> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, notice: &InvitationNotice) -> NotificationResult {
        if self.simulate_failure {
            return NotificationResult::Failed("Simulated failure".to_string());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice.clone());
        }
        tracing::info!(
            invitation_id = %notice.invitation_id,
            notification_type = %notice.notification_type,
            "Mock: Would send invitation notification"
        );
        NotificationResult::Sent
    }
}

#[async_trait::async_trait]
impl InvitationNotifier for MockInvitationNotifier {
    async fn invitation_created(&self, notice: &InvitationNotice) -> NotificationResult {
        self.record(notice)
    }

    async fn invitation_accepted(&self, notice: &InvitationNotice) -> NotificationResult {
        self.record(notice)
    }
}
