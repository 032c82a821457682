/// Authorization helpers and permission checks
///
/// This module provides utilities for role-based access control (RBAC) and
/// resource-level authorization.
///
/// # Permission Model
///
/// 1. **Team Membership**: User must be a member of the team
/// 2. **Role-Based Permissions**: Defined by TeamRole (Owner, Admin, Member, Viewer)
/// 3. **Owner-Only Gates**: Some operations belong to the team owner alone
/// 4. **Scope-Based Permissions**: For API keys with limited scopes
///
/// Owner-only checks are intentionally distinct from role checks so callers
/// can run them *first* and surface `OwnerOnly` instead of a misleading
/// generic permission failure.
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::auth::authorization::{require_role, require_owner};
/// use nextspark_shared::models::team_member::TeamRole;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Admin-level operation
/// require_role(pool, team_id, user_id, TeamRole::Admin).await?;
///
/// // Owner-only operation (checked before the role gate by callers that
/// // accept both, so non-owners get the precise error)
/// require_owner(pool, team_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::team_member::{TeamMember, TeamRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the team
    #[error("Not a member of team {0}")]
    NotMember(Uuid),

    /// User doesn't have required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: TeamRole,
        actual: TeamRole,
    },

    /// Operation is reserved for the team owner
    #[error("Only the team owner can perform this operation")]
    OwnerOnly,

    /// Credential doesn't carry the required scope (API keys)
    #[error("Missing required scope: {0}")]
    MissingScope(String),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a user is a member of a team (any role)
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if the user has no membership row.
pub async fn require_membership(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<TeamRole, AuthzError> {
    TeamMember::get_role(pool, team_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(team_id))
}

/// Checks that a user has at least the given role in a team
///
/// # Errors
///
/// Returns `AuthzError::NotMember` for non-members and
/// `AuthzError::InsufficientRole` for members below the required role.
pub async fn require_role(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    required: TeamRole,
) -> Result<TeamRole, AuthzError> {
    let actual = require_membership(pool, team_id, user_id).await?;

    if !actual.satisfies(required) {
        return Err(AuthzError::InsufficientRole { required, actual });
    }

    Ok(actual)
}

/// Checks that a user is the team owner
///
/// # Errors
///
/// Returns `AuthzError::NotMember` for non-members and `AuthzError::OwnerOnly`
/// for any member below Owner.
pub async fn require_owner(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<(), AuthzError> {
    let actual = require_membership(pool, team_id, user_id).await?;

    if actual != TeamRole::Owner {
        return Err(AuthzError::OwnerOnly);
    }

    Ok(())
}

/// Checks that an auth context carries a required scope
///
/// JWT contexts always pass (their access is governed by role); API key
/// contexts must list the scope (wildcards honored).
///
/// # Errors
///
/// Returns `AuthzError::MissingScope` when an API key lacks the scope.
pub fn require_scope(auth: &AuthContext, scope: &str) -> Result<(), AuthzError> {
    if auth.has_scope(scope) {
        Ok(())
    } else {
        Err(AuthzError::MissingScope(scope.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_scope_jwt_always_passes() {
        let auth = AuthContext::from_jwt(Uuid::new_v4());
        assert!(require_scope(&auth, "tasks:write").is_ok());
    }

    #[test]
    fn test_require_scope_api_key() {
        use crate::models::api_key::ApiKey;
        use chrono::Utc;

        let key = ApiKey {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: "test".to_string(),
            key_prefix: "nsk_abc12".to_string(),
            key_hash: "h".repeat(64),
            scopes: vec!["tasks:read".to_string()],
            revoked: false,
            revoked_at: None,
            expires_at: None,
            last_used_at: None,
            created_at: Utc::now(),
        };
        let auth = AuthContext::from_api_key(&key);

        assert!(require_scope(&auth, "tasks:read").is_ok());
        assert!(matches!(
            require_scope(&auth, "tasks:write"),
            Err(AuthzError::MissingScope(_))
        ));
    }
}
