/// Pattern usage model and bulk operations
///
/// Records which content entities reference which patterns. Rows are
/// maintained by the usage tracker (`crate::content::usage`), which computes
/// a set diff on every save and persists it with exactly two bulk statements:
/// one multi-row INSERT for added references and one DELETE for removed ones.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE pattern_usages (
///     pattern_id UUID NOT NULL REFERENCES patterns(id) ON DELETE CASCADE,
///     entity_type VARCHAR(50) NOT NULL,
///     entity_id UUID NOT NULL,
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (pattern_id, entity_type, entity_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single pattern reference from a content entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PatternUsage {
    /// Referenced pattern
    pub pattern_id: Uuid,

    /// Kind of referencing entity (currently "page")
    pub entity_type: String,

    /// Referencing entity ID
    pub entity_id: Uuid,

    /// Team owning both sides of the reference
    pub team_id: Uuid,

    /// When the reference was first recorded
    pub created_at: DateTime<Utc>,
}

impl PatternUsage {
    /// Inserts usage rows for a batch of pattern ids in one statement
    ///
    /// Conflicting rows (already recorded references) are ignored.
    pub async fn insert_many(
        pool: &PgPool,
        team_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        pattern_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if pattern_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO pattern_usages (pattern_id, entity_type, entity_id, team_id)
            SELECT pid, $2, $3, $4 FROM UNNEST($1::uuid[]) AS pid
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(pattern_ids)
        .bind(entity_type)
        .bind(entity_id)
        .bind(team_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes usage rows for a batch of pattern ids in one statement
    pub async fn delete_many(
        pool: &PgPool,
        entity_type: &str,
        entity_id: Uuid,
        pattern_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if pattern_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM pattern_usages
            WHERE entity_type = $1 AND entity_id = $2 AND pattern_id = ANY($3)
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(pattern_ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists the pattern ids currently recorded for an entity
    pub async fn pattern_ids_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT pattern_id FROM pattern_usages
            WHERE entity_type = $1 AND entity_id = $2
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    /// Lists usages of a pattern within a team
    pub async fn list_by_pattern(
        pool: &PgPool,
        pattern_id: Uuid,
        team_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let usages = sqlx::query_as::<_, PatternUsage>(
            r#"
            SELECT pattern_id, entity_type, entity_id, team_id, created_at
            FROM pattern_usages
            WHERE pattern_id = $1 AND team_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(pattern_id)
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(usages)
    }

    /// Deletes all usage rows recorded for an entity
    ///
    /// Used when the referencing entity itself is deleted.
    pub async fn delete_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM pattern_usages WHERE entity_type = $1 AND entity_id = $2",
        )
        .bind(entity_type)
        .bind(entity_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts how many entities reference a pattern
    pub async fn count_by_pattern(pool: &PgPool, pattern_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pattern_usages WHERE pattern_id = $1")
                .bind(pattern_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
