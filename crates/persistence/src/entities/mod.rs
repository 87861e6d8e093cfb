//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod group;
pub mod group_event;
pub mod group_post;
pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod reaction;
pub mod user;

pub use group::{GroupEntity, GroupPrivacyDb, GroupTypeDb};
pub use group_event::GroupEventEntity;
pub use group_post::{GroupPostEntity, GroupPostWithAuthorEntity};
pub use invitation::{GroupInvitationEntity, InvitationWithGroupEntity};
pub use join_request::{GroupJoinRequestEntity, JoinRequestStatusDb, JoinRequestWithUserEntity};
pub use membership::{GroupMembershipEntity, GroupRoleDb, MemberWithUserEntity};
pub use reaction::ReactionTargetKindDb;
pub use user::UserEntity;
