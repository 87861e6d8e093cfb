//! Service implementations for infrastructure concerns.

pub mod notification;

pub use notification::LoggingInvitationNotifier;
