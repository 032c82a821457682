/// API key management endpoints (team-scoped)
///
/// # Endpoints
///
/// - `POST /api/v1/api-keys` - Create API key (plaintext returned once)
/// - `GET /api/v1/api-keys` - List API keys (masked)
/// - `POST /api/v1/api-keys/:id/revoke` - Revoke API key
///
/// Key management requires a logged-in user (JWT); an API key cannot mint
/// or revoke other keys.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use nextspark_shared::{
    auth::middleware::{AuthContext, AuthMethod},
    billing::entitlement::Entitlements,
    models::api_key::{ApiKey, CreateApiKey},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create API key request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApiKeyRequest {
    /// API key name/description
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Scopes to grant
    ///
    /// Available scopes: `*`, `<resource>:*`, `<resource>:read`,
    /// `<resource>:write` for tasks, customers, pages, patterns.
    #[validate(length(min = 1, message = "At least one scope is required"))]
    pub scopes: Vec<String>,

    /// Optional expiration date (ISO 8601)
    pub expires_at: Option<DateTime<Utc>>,
}

/// Create API key response
///
/// The plaintext key is ONLY returned here; it cannot be retrieved later.
#[derive(Debug, Serialize)]
pub struct CreateApiKeyResponse {
    /// API key ID
    pub id: Uuid,

    /// The plaintext API key (store it now!)
    pub key: String,

    /// API key name
    pub name: String,

    /// Granted scopes
    pub scopes: Vec<String>,

    /// Created at
    pub created_at: DateTime<Utc>,

    /// Expires at
    pub expires_at: Option<DateTime<Utc>>,
}

/// API key list item (masked)
#[derive(Debug, Serialize)]
pub struct ApiKeyListItem {
    /// API key ID
    pub id: Uuid,

    /// API key name
    pub name: String,

    /// Key prefix for display (e.g. "nsk_abc12...")
    pub key_prefix: String,

    /// Granted scopes
    pub scopes: Vec<String>,

    /// Whether the key is revoked
    pub revoked: bool,

    /// Created at
    pub created_at: DateTime<Utc>,

    /// Last used at
    pub last_used_at: Option<DateTime<Utc>>,

    /// Expires at
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyListItem {
    fn from(key: ApiKey) -> Self {
        ApiKeyListItem {
            id: key.id,
            name: key.name,
            key_prefix: format!("{}...", key.key_prefix),
            scopes: key.scopes,
            revoked: key.revoked,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
            expires_at: key.expires_at,
        }
    }
}

fn require_user_auth(auth: &AuthContext) -> ApiResult<()> {
    if auth.method != AuthMethod::Jwt {
        return Err(ApiError::PermissionDenied(
            "API key management requires user authentication".to_string(),
        ));
    }
    Ok(())
}

/// Create an API key for the team
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<CreateApiKeyRequest>,
) -> ApiResult<Json<ApiResponse<CreateApiKeyResponse>>> {
    request.validate()?;
    require_user_auth(&auth)?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "api_keys.create")
        .await?;

    let (api_key, plaintext) = ApiKey::create(
        &state.db,
        CreateApiKey {
            team_id: team.team_id,
            name: request.name,
            scopes: request.scopes,
            expires_at: request.expires_at,
        },
    )
    .await?;

    tracing::info!(api_key_id = %api_key.id, team_id = %team.team_id, "API key created");

    Ok(Json(ApiResponse::new(CreateApiKeyResponse {
        id: api_key.id,
        key: plaintext,
        name: api_key.name,
        scopes: api_key.scopes,
        created_at: api_key.created_at,
        expires_at: api_key.expires_at,
    })))
}

/// List the team's API keys (masked)
pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
) -> ApiResult<Json<ApiResponse<Vec<ApiKeyListItem>>>> {
    require_user_auth(&auth)?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "api_keys.manage")
        .await?;

    let keys = ApiKey::list_by_team(&state.db, team.team_id)
        .await?
        .into_iter()
        .map(ApiKeyListItem::from)
        .collect();

    Ok(Json(ApiResponse::new(keys)))
}

/// Revoke an API key
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(key_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    require_user_auth(&auth)?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "api_keys.manage")
        .await?;

    let revoked = ApiKey::revoke(&state.db, key_id, team.team_id).await?;
    if !revoked {
        return Err(ApiError::NotFound(
            "API key not found or already revoked".to_string(),
        ));
    }

    tracing::info!(api_key_id = %key_id, team_id = %team.team_id, "API key revoked");

    Ok(Json(ApiResponse::new(true)))
}
