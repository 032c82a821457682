/// Authentication context and credential validation
///
/// This module provides the `AuthContext` type injected into request
/// extensions by the API server's authentication middleware, plus the
/// database-backed API key validation used by that middleware.
///
/// # Request Extensions
///
/// After successful authentication the middleware adds:
/// - `AuthContext`: user_id (JWT) or team_id + scopes (API key)
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use nextspark_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user: {:?}", auth.user_id)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::api_key::validate_api_key_format;
use crate::models::api_key::ApiKey;

/// Authentication method used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// JWT token authentication
    Jwt,

    /// API key authentication
    ApiKey,
}

/// Authentication context added to request extensions
///
/// Team context is resolved separately (see the API crate's team-context
/// middleware): JWT users name their team via the `X-Team-Id` header, while
/// API keys are bound to their team at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID (None for API key auth)
    pub user_id: Option<Uuid>,

    /// Team bound to the credential (only for API key auth)
    pub team_id: Option<Uuid>,

    /// Authentication method used
    pub method: AuthMethod,

    /// API key scopes (only for API key auth)
    pub scopes: Option<Vec<String>>,

    /// API key ID (only for API key auth)
    pub api_key_id: Option<Uuid>,
}

impl AuthContext {
    /// Creates auth context from JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            team_id: None,
            method: AuthMethod::Jwt,
            scopes: None,
            api_key_id: None,
        }
    }

    /// Creates auth context from a validated API key
    pub fn from_api_key(api_key: &ApiKey) -> Self {
        Self {
            user_id: None, // API keys are not user-specific
            team_id: Some(api_key.team_id),
            method: AuthMethod::ApiKey,
            scopes: Some(api_key.scopes.clone()),
            api_key_id: Some(api_key.id),
        }
    }

    /// Checks if auth context has a specific scope
    ///
    /// For JWT auth, always returns true (scopes come from the user's role).
    /// For API key auth, checks the scopes list.
    pub fn has_scope(&self, required_scope: &str) -> bool {
        match self.method {
            AuthMethod::Jwt => true,
            AuthMethod::ApiKey => match self.scopes {
                Some(ref scopes) => super::api_key::has_scope(scopes, required_scope),
                None => false,
            },
        }
    }
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// API key validation failed
    InvalidApiKey(String),

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::InvalidApiKey(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Validates an API key against the database
///
/// Checks format, looks up the key by hash, verifies it hasn't been revoked
/// or expired, and records the use. Returns the key row on success.
///
/// # Errors
///
/// Returns `AuthError::InvalidApiKey` for malformed, unknown, revoked, or
/// expired keys, and `AuthError::DatabaseError` on lookup failure.
pub async fn authenticate_api_key(pool: &PgPool, plaintext: &str) -> Result<ApiKey, AuthError> {
    if !validate_api_key_format(plaintext) {
        return Err(AuthError::InvalidApiKey("Malformed API key".to_string()));
    }

    let api_key = ApiKey::find_by_plaintext(pool, plaintext)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AuthError::InvalidApiKey("Unknown API key".to_string()))?;

    if !api_key.is_valid() {
        return Err(AuthError::InvalidApiKey(
            "API key revoked or expired".to_string(),
        ));
    }

    // Best effort; a failed timestamp update must not fail authentication
    if let Err(e) = ApiKey::touch_last_used(pool, api_key.id).await {
        tracing::warn!(api_key_id = %api_key.id, error = %e, "Failed to update last_used_at");
    }

    Ok(api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_api_key(scopes: Vec<String>) -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: "test".to_string(),
            key_prefix: "nsk_abc12".to_string(),
            key_hash: "h".repeat(64),
            scopes,
            revoked: false,
            revoked_at: None,
            expires_at: None,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_context_has_all_scopes() {
        let ctx = AuthContext::from_jwt(Uuid::new_v4());
        assert!(ctx.has_scope("tasks:write"));
        assert!(ctx.has_scope("anything"));
        assert!(ctx.team_id.is_none());
    }

    #[test]
    fn test_api_key_context_scopes() {
        let key = sample_api_key(vec!["tasks:read".to_string()]);
        let ctx = AuthContext::from_api_key(&key);

        assert_eq!(ctx.method, AuthMethod::ApiKey);
        assert_eq!(ctx.team_id, Some(key.team_id));
        assert!(ctx.has_scope("tasks:read"));
        assert!(!ctx.has_scope("tasks:write"));
    }
}
