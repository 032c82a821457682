/// Database models for NextSpark
///
/// This module contains all database models and their CRUD operations.
/// Every team-owned model exposes `find_by_id_and_team` style accessors so
/// that API handlers never read rows across tenant boundaries.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `team`: Organizations/accounts for multi-tenancy
/// - `team_member`: User-team relationships with roles
/// - `subscription`: Billing plan state per team
/// - `task`: Task entity (CRUD scaffolding)
/// - `customer`: Customer/CRM entity
/// - `page`: Page entity with block-tree content
/// - `pattern`: Reusable block-tree fragments
/// - `pattern_usage`: Which entities reference which patterns
/// - `api_key`: API keys for programmatic access
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::user::{User, CreateUser};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Ada Lovelace".to_string()),
///     avatar_url: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod api_key;
pub mod customer;
pub mod page;
pub mod pattern;
pub mod pattern_usage;
pub mod subscription;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;
