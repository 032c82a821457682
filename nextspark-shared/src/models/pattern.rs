/// Pattern model and database operations
///
/// A pattern is a reusable, named block-tree fragment. Pages reference
/// patterns by id via `pattern` blocks; those references are tracked in the
/// `pattern_usages` table by the usage tracker.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE patterns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     author_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL,
///     content JSONB NOT NULL DEFAULT '[]',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (team_id, slug)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Pattern model: a reusable block-tree fragment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pattern {
    /// Unique pattern ID (referenced from page content)
    pub id: Uuid,

    /// Team this pattern belongs to
    pub team_id: Uuid,

    /// Author (nullable if user deleted)
    pub author_id: Option<Uuid>,

    /// Pattern title
    pub title: String,

    /// URL-safe slug, unique per team
    pub slug: String,

    /// Block tree: JSON array of `{id, blockSlug, props}` objects
    pub content: JsonValue,

    /// When the pattern was created
    pub created_at: DateTime<Utc>,

    /// When the pattern was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePattern {
    /// Team ID
    pub team_id: Uuid,

    /// Author
    pub author_id: Option<Uuid>,

    /// Pattern title
    pub title: String,

    /// URL-safe slug
    pub slug: String,

    /// Block tree content
    pub content: JsonValue,
}

/// Input for updating a pattern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePattern {
    /// New title
    pub title: Option<String>,

    /// New slug
    pub slug: Option<String>,

    /// New block tree content
    pub content: Option<JsonValue>,
}

impl Pattern {
    /// Creates a new pattern
    pub async fn create(pool: &PgPool, data: CreatePattern) -> Result<Self, sqlx::Error> {
        let pattern = sqlx::query_as::<_, Pattern>(
            r#"
            INSERT INTO patterns (team_id, author_id, title, slug, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, author_id, title, slug, content, created_at, updated_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.slug)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(pattern)
    }

    /// Finds a pattern by ID with team isolation
    pub async fn find_by_id_and_team(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let pattern = sqlx::query_as::<_, Pattern>(
            r#"
            SELECT id, team_id, author_id, title, slug, content, created_at, updated_at
            FROM patterns
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(pattern)
    }

    /// Updates a pattern with team isolation
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
        data: UpdatePattern,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE patterns SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.slug.is_some() {
            bind_count += 1;
            query.push_str(&format!(", slug = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND team_id = $2 RETURNING id, team_id, author_id, title, slug, \
             content, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Pattern>(&query).bind(id).bind(team_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(slug) = data.slug {
            q = q.bind(slug);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }

        let pattern = q.fetch_optional(pool).await?;

        Ok(pattern)
    }

    /// Deletes a pattern with team isolation
    ///
    /// Cascades to its usage rows.
    pub async fn delete(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM patterns WHERE id = $1 AND team_id = $2")
            .bind(id)
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists patterns for a team with pagination
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let patterns = sqlx::query_as::<_, Pattern>(
            r#"
            SELECT id, team_id, author_id, title, slug, content, created_at, updated_at
            FROM patterns
            WHERE team_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(team_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(patterns)
    }

    /// Counts patterns for a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patterns WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
