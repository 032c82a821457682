/// Team context resolution
///
/// Team-scoped routes (tasks, customers, pages, patterns, api-keys, billing,
/// conversations) act within exactly one team. This middleware resolves
/// which one and with what role:
///
/// - **API key auth**: the key is bound to its team at creation; the request
///   acts in that team. Keys operate at admin level, further restricted by
///   their scopes.
/// - **JWT auth**: the client names the team in the `X-Team-Id` header; the
///   user's membership row supplies the role.
///
/// A JWT request without the header is answered with 403
/// `TEAM_CONTEXT_REQUIRED` - distinct from `PERMISSION_DENIED`, which is
/// reserved for requests that named a team the caller can't act in.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use nextspark_shared::auth::middleware::AuthContext;
use nextspark_shared::models::team_member::{TeamMember, TeamRole};

use crate::{app::AppState, error::ApiError};

/// Header naming the team a JWT request acts in
pub const TEAM_HEADER: &str = "X-Team-Id";

/// Resolved team context added to request extensions
#[derive(Debug, Clone, Copy)]
pub struct TeamContext {
    /// Team the request acts in
    pub team_id: Uuid,

    /// Caller's effective role within the team
    pub role: TeamRole,

    /// Acting user (None for API key auth)
    pub user_id: Option<Uuid>,
}

/// Middleware resolving team context after authentication
///
/// Must be layered inside the authentication middleware so the
/// `AuthContext` extension is present.
pub async fn team_context_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication context".to_string()))?;

    let ctx = match auth.team_id {
        // API key: team bound at creation, admin-level within scopes
        Some(team_id) => TeamContext {
            team_id,
            role: TeamRole::Admin,
            user_id: None,
        },

        // JWT: team named by header, role from membership
        None => {
            let user_id = auth
                .user_id
                .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

            let header = req
                .headers()
                .get(TEAM_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::TeamContextRequired)?;

            let team_id = Uuid::parse_str(header)
                .map_err(|_| ApiError::BadRequest(format!("{} must be a UUID", TEAM_HEADER)))?;

            let role = TeamMember::get_role(&state.db, team_id, user_id)
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| {
                    ApiError::PermissionDenied("Not a member of this team".to_string())
                })?;

            TeamContext {
                team_id,
                role,
                user_id: Some(user_id),
            }
        }
    };

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
