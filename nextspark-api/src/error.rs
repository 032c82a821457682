/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts into the
/// platform's failure envelope:
///
/// ```json
/// {"success": false, "error": "Only the team owner can do that", "code": "OWNER_ONLY"}
/// ```
///
/// Authorization failures carry differentiated codes (`OWNER_ONLY`,
/// `PERMISSION_DENIED`, `TEAM_CONTEXT_REQUIRED`, `FEATURE_NOT_AVAILABLE`,
/// `QUOTA_EXCEEDED`) so clients can render precise UX instead of a generic
/// 403.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;

use nextspark_shared::auth::authorization::AuthzError;
use nextspark_shared::auth::jwt::JwtError;
use nextspark_shared::auth::middleware::AuthError;
use nextspark_shared::auth::password::PasswordError;
use nextspark_shared::billing::entitlement::EntitlementError;
use nextspark_shared::content::registry::ContentError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Generic permission failure (403, PERMISSION_DENIED)
    PermissionDenied(String),

    /// Owner-only operation attempted by a non-owner (403, OWNER_ONLY)
    OwnerOnly,

    /// Team-scoped route called without team context (403, TEAM_CONTEXT_REQUIRED)
    TeamContextRequired,

    /// Plan does not include the feature (403, FEATURE_NOT_AVAILABLE)
    FeatureNotAvailable(String),

    /// Quota exhausted (403, QUOTA_EXCEEDED)
    QuotaExceeded {
        resource: &'static str,
        current: i64,
        limit: i64,
    },

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email or slug
    Conflict(String),

    /// Validation failure (400, VALIDATION_FAILED) with per-field details
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field (or content path) that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            ApiError::OwnerOnly => write!(f, "Only the team owner can perform this operation"),
            ApiError::TeamContextRequired => write!(f, "Team context required"),
            ApiError::FeatureNotAvailable(msg) => write!(f, "Feature not available: {}", msg),
            ApiError::QuotaExceeded {
                resource,
                current,
                limit,
            } => write!(f, "{} quota exceeded ({}/{})", resource, current, limit),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::PermissionDenied(_) => "PERMISSION_DENIED",
            ApiError::OwnerOnly => "OWNER_ONLY",
            ApiError::TeamContextRequired => "TEAM_CONTEXT_REQUIRED",
            ApiError::FeatureNotAvailable(_) => "FEATURE_NOT_AVAILABLE",
            ApiError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_FAILED",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for the error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_)
            | ApiError::OwnerOnly
            | ApiError::TeamContextRequired
            | ApiError::FeatureNotAvailable(_)
            | ApiError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            // Never leak internals to clients
            ApiError::InternalError(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut body: JsonValue = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        match &self {
            ApiError::ValidationError(details) => {
                body["details"] = json!(details);
            }
            ApiError::QuotaExceeded {
                resource,
                current,
                limit,
            } => {
                body["details"] = json!({
                    "resource": resource,
                    "current": current,
                    "limit": limit,
                });
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Convert request DTO validation failures
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed {} validation", e.code)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

/// Convert block-tree validation failures
impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotAnArray => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "content".to_string(),
                message: "Content must be a JSON array of blocks".to_string(),
            }]),
            ContentError::Invalid(violations) => ApiError::ValidationError(
                violations
                    .into_iter()
                    .map(|v| ValidationErrorDetail {
                        field: format!("content{}", v.path),
                        message: v.message,
                    })
                    .collect(),
            ),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint.contains("slug") {
                        return ApiError::Conflict("Slug already taken".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors, preserving the differentiated codes
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) => {
                ApiError::PermissionDenied("Not a member of this team".to_string())
            }
            AuthzError::InsufficientRole { .. } => {
                ApiError::PermissionDenied("Insufficient role for this operation".to_string())
            }
            AuthzError::OwnerOnly => ApiError::OwnerOnly,
            AuthzError::MissingScope(scope) => {
                ApiError::PermissionDenied(format!("Missing required scope: {}", scope))
            }
            AuthzError::DatabaseError(err) => {
                ApiError::InternalError(format!("Database error: {}", err))
            }
        }
    }
}

/// Convert entitlement errors, naming the failing layer
impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        match err {
            EntitlementError::PermissionDenied { action, .. } => {
                ApiError::PermissionDenied(format!("Role may not perform {}", action))
            }
            EntitlementError::FeatureNotAvailable { feature, plan, .. } => {
                ApiError::FeatureNotAvailable(format!(
                    "The {} feature is not included in the {} plan",
                    feature,
                    plan.as_str()
                ))
            }
            EntitlementError::QuotaExceeded {
                resource,
                current,
                limit,
            } => ApiError::QuotaExceeded {
                resource,
                current,
                limit,
            },
            EntitlementError::Database(err) => {
                ApiError::InternalError(format!("Database error: {}", err))
            }
        }
    }
}

/// Convert authentication errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidApiKey(msg) => ApiError::Unauthorized(msg),
            AuthError::DatabaseError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert JWT errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(ApiError::OwnerOnly.code(), "OWNER_ONLY");
        assert_eq!(ApiError::OwnerOnly.status(), StatusCode::FORBIDDEN);

        assert_eq!(ApiError::TeamContextRequired.code(), "TEAM_CONTEXT_REQUIRED");
        assert_eq!(ApiError::TeamContextRequired.status(), StatusCode::FORBIDDEN);

        let quota = ApiError::QuotaExceeded {
            resource: "tasks",
            current: 100,
            limit: 100,
        };
        assert_eq!(quota.code(), "QUOTA_EXCEEDED");
        assert_eq!(quota.status(), StatusCode::FORBIDDEN);

        assert_eq!(
            ApiError::ValidationError(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_authz_error_mapping_preserves_owner_only() {
        let err: ApiError = AuthzError::OwnerOnly.into();
        assert_eq!(err.code(), "OWNER_ONLY");

        let err: ApiError = AuthzError::NotMember(uuid::Uuid::nil()).into();
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_entitlement_error_mapping() {
        use nextspark_shared::models::subscription::Plan;
        use nextspark_shared::models::team_member::TeamRole;

        let err: ApiError = EntitlementError::PermissionDenied {
            action: "tasks.create".to_string(),
            role: TeamRole::Viewer,
        }
        .into();
        assert_eq!(err.code(), "PERMISSION_DENIED");

        let err: ApiError = EntitlementError::FeatureNotAvailable {
            action: "ai.converse".to_string(),
            plan: Plan::Free,
            feature: "ai",
        }
        .into();
        assert_eq!(err.code(), "FEATURE_NOT_AVAILABLE");

        let err: ApiError = EntitlementError::QuotaExceeded {
            resource: "tasks",
            current: 100,
            limit: 100,
        }
        .into();
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::QuotaExceeded {
            resource: "pages",
            current: 50,
            limit: 50,
        };
        assert_eq!(err.to_string(), "pages quota exceeded (50/50)");
    }
}
