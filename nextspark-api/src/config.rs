/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. A `.env` file (and a `.env.local`
/// override) are loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: database connection string (required; postgresql/
///   postgres/mysql/sqlite schemes are recognized, only postgres is runnable)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins, or `*` (default: `*`)
/// - `PRODUCTION`: enables HSTS and strict CORS handling (default: false)
/// - `JWT_SECRET`: secret key for JWT signing (required, >= 32 chars)
/// - `WEBHOOK_ROUTES`: webhook routing table (see `nextspark_shared::webhooks`)
/// - `WEBHOOK_SIGNING_SECRET`: HMAC secret for webhook signatures
/// - `WEBHOOK_TIMEOUT_SECONDS`: per-delivery timeout (default: 10)
/// - `LLM_ENDPOINT`: intent-extraction endpoint (assistant disabled if unset)
/// - `LLM_API_KEY`: bearer token for the LLM endpoint
/// - `LLM_TIMEOUT_SECONDS`: extraction timeout (default: 30)
///
/// # Example
///
/// ```no_run
/// use nextspark_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Database URL schemes the platform recognizes
///
/// Only Postgres is runnable by this server; the others are recognized so
/// configuration mistakes produce a precise error instead of a connect
/// failure, and so the health endpoint can report the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseScheme {
    Postgres,
    Mysql,
    Sqlite,
}

impl DatabaseScheme {
    /// Recognizes the scheme of a database URL
    pub fn recognize(url: &str) -> Option<Self> {
        if url.starts_with("postgresql://") || url.starts_with("postgres://") {
            Some(DatabaseScheme::Postgres)
        } else if url.starts_with("mysql://") {
            Some(DatabaseScheme::Mysql)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Some(DatabaseScheme::Sqlite)
        } else {
            None
        }
    }

    /// Scheme name for display
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseScheme::Postgres => "postgres",
            DatabaseScheme::Mysql => "mysql",
            DatabaseScheme::Sqlite => "sqlite",
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Webhook egress configuration
    pub webhooks: WebhookConfig,

    /// Assistant/LLM configuration
    pub llm: LlmConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` = permissive)
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Recognized URL scheme
    pub scheme: DatabaseScheme,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be kept secret and at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Webhook egress configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Raw routes spec (`key=url` pairs), empty string disables egress
    pub routes: String,

    /// HMAC signing secret for outbound payloads
    pub signing_secret: Option<String>,

    /// Per-delivery timeout in seconds
    pub timeout_seconds: u64,
}

/// Assistant/LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Intent-extraction endpoint (assistant disabled if None)
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    pub api_key: Option<String>,

    /// Extraction timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing, have invalid
    /// values, or the database URL scheme is unrecognized/unsupported.
    pub fn from_env() -> anyhow::Result<Self> {
        // .env.local wins over .env (first load wins in dotenvy)
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let scheme = DatabaseScheme::recognize(&database_url).ok_or_else(|| {
            anyhow::anyhow!(
                "DATABASE_URL scheme not recognized (expected postgresql://, postgres://, mysql://, or sqlite:)"
            )
        })?;

        if scheme != DatabaseScheme::Postgres {
            anyhow::bail!(
                "DATABASE_URL scheme {} is recognized but not runnable; this server requires postgres",
                scheme.as_str()
            );
        }

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let webhook_routes = env::var("WEBHOOK_ROUTES").unwrap_or_default();
        let webhook_signing_secret = env::var("WEBHOOK_SIGNING_SECRET").ok();
        let webhook_timeout_seconds = env::var("WEBHOOK_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()?;

        let llm_endpoint = env::var("LLM_ENDPOINT").ok().filter(|s| !s.is_empty());
        let llm_api_key = env::var("LLM_API_KEY").ok();
        let llm_timeout_seconds = env::var("LLM_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                scheme,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            webhooks: WebhookConfig {
                routes: webhook_routes,
                signing_secret: webhook_signing_secret,
                timeout_seconds: webhook_timeout_seconds,
            },
            llm: LlmConfig {
                endpoint: llm_endpoint,
                api_key: llm_api_key,
                timeout_seconds: llm_timeout_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_recognition() {
        assert_eq!(
            DatabaseScheme::recognize("postgresql://localhost/db"),
            Some(DatabaseScheme::Postgres)
        );
        assert_eq!(
            DatabaseScheme::recognize("postgres://localhost/db"),
            Some(DatabaseScheme::Postgres)
        );
        assert_eq!(
            DatabaseScheme::recognize("mysql://localhost/db"),
            Some(DatabaseScheme::Mysql)
        );
        assert_eq!(
            DatabaseScheme::recognize("sqlite://app.db"),
            Some(DatabaseScheme::Sqlite)
        );
        assert_eq!(
            DatabaseScheme::recognize("sqlite:app.db"),
            Some(DatabaseScheme::Sqlite)
        );
        assert_eq!(DatabaseScheme::recognize("redis://localhost"), None);
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                scheme: DatabaseScheme::Postgres,
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            webhooks: WebhookConfig {
                routes: String::new(),
                signing_secret: None,
                timeout_seconds: 10,
            },
            llm: LlmConfig {
                endpoint: None,
                api_key: None,
                timeout_seconds: 30,
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
