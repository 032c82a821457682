/// Database utilities
///
/// This module provides the PostgreSQL connection pool and migration runner:
///
/// - `pool`: Connection pool creation with health checks
/// - `migrations`: Embedded migration runner

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, health_check, DatabaseConfig};
