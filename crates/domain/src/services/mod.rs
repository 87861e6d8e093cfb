//! Domain services for the parish network.
//!
//! Services contain the group rules and the operations that apply them.

pub mod content;
pub mod counters;
pub mod lifecycle;
pub mod notification;
pub mod permissions;
pub mod store;
pub mod visibility;

pub use content::GroupContentService;
pub use counters::CounterSynchronizer;
pub use lifecycle::{JoinOutcome, MembershipLifecycle};
pub use notification::{
    InvitationNotice, InvitationNotifier, MockInvitationNotifier, NotificationResult,
    NotificationType,
};
pub use permissions::{check_join_eligibility, GroupAction, PermissionEvaluator};
pub use store::{GroupStore, GroupTransaction};
pub use visibility::can_view;
