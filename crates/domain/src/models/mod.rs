//! Domain models for the parish network.

pub mod group;
pub mod group_event;
pub mod group_post;
pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod parish;
pub mod reaction;
pub mod user;

pub use group::{Group, GroupPrivacy, GroupRole, GroupType};
pub use group_event::GroupEvent;
pub use group_post::{GroupPost, PostModeration};
pub use invitation::{GroupInvitation, InviteTarget};
pub use join_request::{GroupJoinRequest, JoinRequestStatus};
pub use membership::GroupMembership;
pub use parish::{Diocese, Parish};
pub use reaction::{Reaction, ReactionTarget, ReactionTargetKind};
pub use user::{Actor, User, UserSummary};
