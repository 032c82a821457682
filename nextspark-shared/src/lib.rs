//! # NextSpark Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the NextSpark API server and the assistant plugin.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `billing`: Plan catalog and the three-layer entitlement evaluator
//! - `content`: Block/pattern content model and pattern-usage tracking
//! - `actions`: Scheduled-action registry (named fire-and-forget callbacks)
//! - `webhooks`: Webhook egress routing, signing, and delivery
//! - `db`: Connection pool and migrations

pub mod actions;
pub mod auth;
pub mod billing;
pub mod content;
pub mod db;
pub mod models;
pub mod webhooks;

/// Current version of the NextSpark shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
