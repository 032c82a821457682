/// Health check endpoint
///
/// Verifies the server is running and the database is reachable, and reports
/// the recognized database scheme.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "database_scheme": "postgres"
///   }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Recognized database URL scheme
    pub database_scheme: String,
}

/// Health check handler
pub async fn health_check(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<HealthResponse>>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database probe failed");
            "disconnected"
        }
    };

    let status = if database_status == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(ApiResponse::new(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
        database_scheme: state.config.database.scheme.as_str().to_string(),
    })))
}
