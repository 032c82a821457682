/// Database migration runner
///
/// This module runs the embedded SQL migrations from the `migrations/`
/// directory at the crate root. Each migration consists of two files:
/// - `{version}_{name}.sql` - The "up" migration
/// - `{version}_{name}.down.sql` - The "down" migration (rollback)
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use nextspark_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{error, info};

/// Runs all pending database migrations
///
/// Migrations that have already been applied are skipped; sqlx tracks applied
/// versions in the `_sqlx_migrations` table.
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a migration fails to
/// execute, or the database connection is lost during migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Database migration failed");
            Err(e)
        }
    }
}
