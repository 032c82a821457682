/// Team model and database operations
///
/// This module provides the Team model for multi-tenant isolation.
/// Every user belongs to one or more teams via the TeamMember model, and
/// every entity row (task, customer, page, pattern) carries a `team_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     settings JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::team::{Team, CreateTeam};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let team = Team::create(&pool, CreateTeam {
///     name: "Acme Corp".to_string(),
///     slug: "acme-corp".to_string(),
/// }).await?;
/// println!("Created team: {}", team.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Team model representing an organization/account
///
/// Teams are the top-level entity for multi-tenant isolation.
/// All resources (tasks, pages, API keys, etc.) belong to a team.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID (UUID v4)
    pub id: Uuid,

    /// Organization/account name
    pub name: String,

    /// URL-safe unique identifier
    ///
    /// Must match `^[a-z0-9]+(?:-[a-z0-9]+)*$`; changing it is owner-only.
    pub slug: String,

    /// Team-specific configuration (JSONB)
    ///
    /// Example: {"default_locale": "en", "timezone": "UTC"}
    pub settings: JsonValue,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Organization/account name
    pub name: String,

    /// URL-safe unique identifier
    pub slug: String,
}

/// Input for updating an existing team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New name
    pub name: Option<String>,

    /// New slug (owner-only, enforced at the route layer)
    pub slug: Option<String>,

    /// Update settings (merged with existing settings, not replaced)
    pub settings: Option<JsonValue>,
}

impl UpdateTeam {
    /// Whether this update touches fields only the team owner may change
    pub fn touches_owner_only_fields(&self) -> bool {
        self.slug.is_some()
    }
}

impl Team {
    /// Creates a new team in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is already taken (unique constraint) or
    /// the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, settings, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, slug, settings, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Finds a team by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, slug, settings, created_at, updated_at
            FROM teams
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Updates an existing team
    ///
    /// Only non-None fields in `data` will be updated. Settings are merged
    /// with existing settings (jsonb || operator), not replaced.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE teams SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.slug.is_some() {
            bind_count += 1;
            query.push_str(&format!(", slug = ${}", bind_count));
        }
        if data.settings.is_some() {
            bind_count += 1;
            query.push_str(&format!(", settings = settings || ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, slug, settings, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Team>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(slug) = data.slug {
            q = q.bind(slug);
        }
        if let Some(settings) = data.settings {
            q = q.bind(settings);
        }

        let team = q.fetch_optional(pool).await?;

        Ok(team)
    }

    /// Deletes a team by ID
    ///
    /// Cascades to all team-owned data (tasks, pages, API keys, etc.).
    /// Owner-only; enforced at the route layer.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the teams a user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.slug, t.settings, t.created_at, t.updated_at
            FROM teams t
            JOIN team_members m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Counts total number of teams
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_team_default() {
        let update = UpdateTeam::default();
        assert!(update.name.is_none());
        assert!(update.slug.is_none());
        assert!(update.settings.is_none());
        assert!(!update.touches_owner_only_fields());
    }

    #[test]
    fn test_owner_only_fields() {
        let update = UpdateTeam {
            slug: Some("new-slug".to_string()),
            ..Default::default()
        };
        assert!(update.touches_owner_only_fields());

        let update = UpdateTeam {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        assert!(!update.touches_owner_only_fields());
    }
}
