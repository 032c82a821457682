/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: Profile endpoints
/// - `teams`: Team and membership management
/// - `tasks`, `customers`, `pages`, `patterns`: entity CRUD
/// - `api_keys`: API key management
/// - `billing`: Subscription, plan changes, usage
/// - `conversations`: AI assistant endpoint

pub mod api_keys;
pub mod auth;
pub mod billing;
pub mod conversations;
pub mod customers;
pub mod health;
pub mod pages;
pub mod patterns;
pub mod tasks;
pub mod teams;
pub mod users;

use serde::Deserialize;

/// Shared pagination query parameters for list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,

    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped page size
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    /// Non-negative offset
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        let p = Pagination {
            limit: None,
            offset: None,
        };
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            limit: Some(1000),
            offset: Some(-5),
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            limit: Some(0),
            offset: Some(40),
        };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 40);
    }
}
