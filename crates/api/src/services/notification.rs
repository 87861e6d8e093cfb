//! Invitation notifier backed by the structured log.
//!
//! Each notice is rendered into a short message with a link back to the
//! invitation and written as a log event. When notifications are disabled the
//! notice is skipped.

use async_trait::async_trait;
use domain::services::{InvitationNotice, InvitationNotifier, NotificationResult};
use tracing::{debug, info};

use crate::config::NotificationsConfig;

/// Rendered notification ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

/// Notifier that writes invitation notices to the log.
#[derive(Debug, Clone)]
pub struct LoggingInvitationNotifier {
    config: NotificationsConfig,
}

impl LoggingInvitationNotifier {
    pub fn new(config: NotificationsConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn invitations_link(&self) -> String {
        format!("{}/invitations", self.config.base_url.trim_end_matches('/'))
    }

    /// Message telling the invitee about a new invitation.
    pub fn render_created(&self, notice: &InvitationNotice) -> NotificationMessage {
        let mut body_text = format!(
            "You have been invited to join \"{}\".\n",
            notice.group_name
        );
        if let Some(message) = &notice.message {
            body_text.push_str(&format!("\n{}\n", message));
        }
        body_text.push_str(&format!(
            "\nRespond before {}: {}\n",
            notice.expires_at.format("%Y-%m-%d"),
            self.invitations_link()
        ));

        NotificationMessage {
            from: self.config.sender_email.clone(),
            to: notice.invited_email.clone(),
            subject: format!("Invitation to {}", notice.group_name),
            body_text,
        }
    }

    /// Message confirming an accepted invitation.
    pub fn render_accepted(&self, notice: &InvitationNotice) -> NotificationMessage {
        NotificationMessage {
            from: self.config.sender_email.clone(),
            to: notice.invited_email.clone(),
            subject: format!("Welcome to {}", notice.group_name),
            body_text: format!("You are now a member of \"{}\".\n", notice.group_name),
        }
    }

    fn deliver(&self, notice: &InvitationNotice, message: NotificationMessage) -> NotificationResult {
        if !self.config.enabled {
            debug!(
                invitation_id = %notice.invitation_id,
                notification_type = %notice.notification_type,
                "Notifications disabled, skipping send"
            );
            return NotificationResult::Skipped;
        }

        info!(
            invitation_id = %notice.invitation_id,
            group_id = %notice.group_id,
            notification_type = %notice.notification_type,
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Invitation notification sent"
        );
        NotificationResult::Sent
    }
}

#[async_trait]
impl InvitationNotifier for LoggingInvitationNotifier {
    async fn invitation_created(&self, notice: &InvitationNotice) -> NotificationResult {
        let message = self.render_created(notice);
        self.deliver(notice, message)
    }

    async fn invitation_accepted(&self, notice: &InvitationNotice) -> NotificationResult {
        let message = self.render_accepted(notice);
        self.deliver(notice, message)
    }
}
