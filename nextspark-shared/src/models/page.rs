/// Page model and database operations
///
/// Pages carry a block-tree `content` column (see `crate::content`) and a
/// draft/published lifecycle. Slugs are unique per team.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE pages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     author_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL,
///     status VARCHAR(50) NOT NULL DEFAULT 'draft',
///     content JSONB NOT NULL DEFAULT '[]',
///     published_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (team_id, slug)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::page::{Page, CreatePage};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use serde_json::json;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let page = Page::create(&pool, CreatePage {
///     team_id: Uuid::new_v4(),
///     author_id: Some(Uuid::new_v4()),
///     title: "Landing".to_string(),
///     slug: "landing".to_string(),
///     content: json!([{"id": "b1", "blockSlug": "hero", "props": {"heading": "Hi"}}]),
/// }).await?;
///
/// Page::publish(&pool, page.id, page.team_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Page lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    /// Visible only to the team
    Draft,

    /// Publicly visible
    Published,
}

impl PageStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }

    /// Parses status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PageStatus::Draft),
            "published" => Some(PageStatus::Published),
            _ => None,
        }
    }
}

/// Page model with block-tree content
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    /// Unique page ID
    pub id: Uuid,

    /// Team this page belongs to
    pub team_id: Uuid,

    /// Author (nullable if user deleted)
    pub author_id: Option<Uuid>,

    /// Page title
    pub title: String,

    /// URL-safe slug, unique per team
    pub slug: String,

    /// Lifecycle status ("draft", "published")
    pub status: String,

    /// Block tree: JSON array of `{id, blockSlug, props}` objects
    pub content: JsonValue,

    /// When the page was last published (None if never)
    pub published_at: Option<DateTime<Utc>>,

    /// When the page was created
    pub created_at: DateTime<Utc>,

    /// When the page was last updated
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<PageStatus> {
        PageStatus::parse(&self.status)
    }
}

/// Input for creating a new page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePage {
    /// Team ID
    pub team_id: Uuid,

    /// Author
    pub author_id: Option<Uuid>,

    /// Page title
    pub title: String,

    /// URL-safe slug
    pub slug: String,

    /// Block tree content
    pub content: JsonValue,
}

/// Input for updating a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePage {
    /// New title
    pub title: Option<String>,

    /// New slug
    pub slug: Option<String>,

    /// New block tree content
    pub content: Option<JsonValue>,
}

impl Page {
    /// Creates a new page in draft state
    pub async fn create(pool: &PgPool, data: CreatePage) -> Result<Self, sqlx::Error> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (team_id, author_id, title, slug, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, author_id, title, slug, status, content,
                      published_at, created_at, updated_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.author_id)
        .bind(data.title)
        .bind(data.slug)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(page)
    }

    /// Finds a page by ID with team isolation
    pub async fn find_by_id_and_team(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, team_id, author_id, title, slug, status, content,
                   published_at, created_at, updated_at
            FROM pages
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(page)
    }

    /// Finds a page by slug within a team
    pub async fn find_by_slug(
        pool: &PgPool,
        team_id: Uuid,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, team_id, author_id, title, slug, status, content,
                   published_at, created_at, updated_at
            FROM pages
            WHERE team_id = $1 AND slug = $2
            "#,
        )
        .bind(team_id)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(page)
    }

    /// Updates a page with team isolation
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
        data: UpdatePage,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE pages SET updated_at = NOW()");
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
             status, content, published_at, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Page>(&query).bind(id).bind(team_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(slug) = data.slug {
            q = q.bind(slug);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }

        let page = q.fetch_optional(pool).await?;

        Ok(page)
    }

    /// Publishes a page
    ///
    /// Sets status and the published_at timestamp.
    pub async fn publish(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            UPDATE pages
            SET status = 'published',
                published_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND team_id = $2
            RETURNING id, team_id, author_id, title, slug, status, content,
                      published_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(page)
    }

    /// Deletes a page with team isolation
    pub async fn delete(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1 AND team_id = $2")
            .bind(id)
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists pages for a team with pagination
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, team_id, author_id, title, slug, status, content,
                   published_at, created_at, updated_at
            FROM pages
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

        Ok(pages)
    }

    /// Counts pages for a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_status_round_trip() {
        assert_eq!(PageStatus::parse("draft"), Some(PageStatus::Draft));
        assert_eq!(PageStatus::parse("published"), Some(PageStatus::Published));
        assert_eq!(PageStatus::parse("scheduled"), None);
    }
}
