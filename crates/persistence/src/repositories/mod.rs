//! Repository implementations for read-side database queries.
//!
//! Writes go through [`crate::store::PgGroupStore`].

pub mod group;
pub mod group_event;
pub mod group_post;
pub mod invitation;
pub mod join_request;
pub mod membership;
pub mod user;

pub use group::{GroupListFilter, GroupRepository};
pub use group_event::GroupEventRepository;
pub use group_post::GroupPostRepository;
pub use invitation::InvitationRepository;
pub use join_request::JoinRequestRepository;
pub use membership::MembershipRepository;
pub use user::UserRepository;
