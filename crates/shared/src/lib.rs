//! Shared utilities and common types for the parish network backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT access token validation (and issuing, for tooling and tests)
//! - Page/offset pagination helpers
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
