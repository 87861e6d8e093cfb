//! Domain layer for the parish network backend.
//!
//! This crate contains:
//! - Domain models (Group, GroupMembership, join requests, invitations, posts, events)
//! - The visibility and permission rules for groups
//! - The membership lifecycle controller and counter synchronizer
//! - Store traits implemented by the persistence layer, plus an in-memory store for unit tests
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
#[cfg(test)]
pub mod testing;

pub use error::{GroupError, StoreError};
