/// API Key model and database operations
///
/// API keys grant programmatic, team-scoped access. Keys are generated once,
/// returned in plaintext a single time, and stored only as SHA-256 hashes.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE api_keys (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     key_prefix VARCHAR(16) NOT NULL,
///     key_hash VARCHAR(64) NOT NULL UNIQUE,
///     scopes TEXT[] NOT NULL DEFAULT ARRAY[]::TEXT[],
///     revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     revoked_at TIMESTAMPTZ,
///     expires_at TIMESTAMPTZ,
///     last_used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::api_key::{ApiKey, CreateApiKey};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let (api_key, plaintext) = ApiKey::create(&pool, CreateApiKey {
///     team_id: Uuid::new_v4(),
///     name: "Production".to_string(),
///     scopes: vec!["tasks:read".to_string(), "tasks:write".to_string()],
///     expires_at: None,
/// }).await?;
///
/// // Save plaintext now - it is never shown again
/// println!("API key: {}", plaintext);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::api_key::{generate_api_key, hash_api_key};

/// API Key model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique API key ID
    pub id: Uuid,

    /// Team this key belongs to
    pub team_id: Uuid,

    /// Human-readable name for the key
    pub name: String,

    /// First characters of the key for display (e.g. "nsk_ab12...")
    pub key_prefix: String,

    /// SHA-256 hash of the full key (never store plaintext!)
    #[serde(skip_serializing)]
    pub key_hash: String,

    /// Permission scopes (e.g. ["tasks:read", "tasks:write", "*"])
    pub scopes: Vec<String>,

    /// Whether the key has been revoked
    pub revoked: bool,

    /// When the key was revoked (if applicable)
    pub revoked_at: Option<DateTime<Utc>>,

    /// Optional expiration date
    pub expires_at: Option<DateTime<Utc>>,

    /// When the key was last used
    pub last_used_at: Option<DateTime<Utc>>,

    /// When the key was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKey {
    /// Team ID
    pub team_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Permission scopes
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Optional expiration date
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_scopes() -> Vec<String> {
    vec!["tasks:read".to_string(), "tasks:write".to_string()]
}

impl ApiKey {
    /// Whether the key is currently usable
    pub fn is_valid(&self) -> bool {
        if self.revoked {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > Utc::now(),
            None => true,
        }
    }

    /// Creates a new API key
    ///
    /// Generates the key material, stores only its hash, and returns the
    /// plaintext alongside the row. The plaintext is never retrievable again.
    pub async fn create(pool: &PgPool, data: CreateApiKey) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, hash) = generate_api_key();
        let prefix: String = plaintext.chars().take(10).collect();

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (team_id, name, key_prefix, key_hash, scopes, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, team_id, name, key_prefix, key_hash, scopes,
                      revoked, revoked_at, expires_at, last_used_at, created_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.name)
        .bind(prefix)
        .bind(hash)
        .bind(&data.scopes)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok((api_key, plaintext))
    }

    /// Finds an API key by its plaintext value
    ///
    /// Hashes the plaintext and looks the hash up; used by the
    /// authentication middleware.
    pub async fn find_by_plaintext(
        pool: &PgPool,
        plaintext: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let hash = hash_api_key(plaintext);

        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, team_id, name, key_prefix, key_hash, scopes,
                   revoked, revoked_at, expires_at, last_used_at, created_at
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(pool)
        .await?;

        Ok(api_key)
    }

    /// Finds an API key by ID with team isolation
    pub async fn find_by_id_and_team(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, team_id, name, key_prefix, key_hash, scopes,
                   revoked, revoked_at, expires_at, last_used_at, created_at
            FROM api_keys
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(api_key)
    }

    /// Records that the key was used
    pub async fn touch_last_used(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Revokes an API key with team isolation
    pub async fn revoke(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET revoked = TRUE, revoked_at = NOW()
            WHERE id = $1 AND team_id = $2 AND revoked = FALSE
            "#,
        )
        .bind(id)
        .bind(team_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists API keys for a team
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let keys = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, team_id, name, key_prefix, key_hash, scopes,
                   revoked, revoked_at, expires_at, last_used_at, created_at
            FROM api_keys
            WHERE team_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(keys)
    }

    /// Counts active (non-revoked) API keys for a team
    pub async fn count_active_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM api_keys WHERE team_id = $1 AND revoked = FALSE",
        )
        .bind(team_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key(revoked: bool, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: "test".to_string(),
            key_prefix: "nsk_abc12".to_string(),
            key_hash: "x".repeat(64),
            scopes: default_scopes(),
            revoked,
            revoked_at: None,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(sample_key(false, None).is_valid());
        assert!(!sample_key(true, None).is_valid());

        let future = Utc::now() + chrono::Duration::hours(1);
        let past = Utc::now() - chrono::Duration::hours(1);
        assert!(sample_key(false, Some(future)).is_valid());
        assert!(!sample_key(false, Some(past)).is_valid());
    }

    #[test]
    fn test_default_scopes() {
        let scopes = default_scopes();
        assert!(scopes.contains(&"tasks:read".to_string()));
        assert!(scopes.contains(&"tasks:write".to_string()));
    }
}
