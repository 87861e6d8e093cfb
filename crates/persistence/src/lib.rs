//! Persistence layer for the parish network backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Read repositories for listings
//! - The transactional PostgreSQL group store

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::PgGroupStore;
