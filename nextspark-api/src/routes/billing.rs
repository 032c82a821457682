/// Billing endpoints (team-scoped)
///
/// # Endpoints
///
/// - `GET /api/v1/billing/subscription` - Current subscription (synthesized
///   free-plan view when no row exists)
/// - `PUT /api/v1/billing/plan` - Change plan (owner-only)
/// - `GET /api/v1/billing/usage` - Per-resource usage vs. plan limits
///
/// Plan changes check ownership before anything else so non-owner admins
/// receive `OWNER_ONLY` rather than a generic permission failure.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::ApiResponse,
};
use axum::{extract::State, Extension, Json};
use nextspark_shared::{
    auth::authorization::require_owner,
    billing::entitlement::{Entitlements, TeamUsage},
    billing::plans::plan_features,
    models::subscription::{Plan, Subscription},
};
use serde::{Deserialize, Serialize};

/// Subscription view
///
/// Present even when the team has no subscription row (implicit free plan).
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    /// Effective plan
    pub plan: Plan,

    /// Lifecycle status ("active" for the implicit free plan)
    pub status: String,

    /// Features the plan includes (`["*"]` = all)
    pub features: Vec<String>,

    /// Stored subscription row, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

/// Change plan request
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    /// Target plan ("free", "starter", "pro", "enterprise")
    pub plan: String,
}

/// Current subscription state for the team
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(team): Extension<TeamContext>,
) -> ApiResult<Json<ApiResponse<SubscriptionView>>> {
    let subscription = Subscription::find_by_team(&state.db, team.team_id).await?;
    let plan = Subscription::plan_for_team(&state.db, team.team_id).await?;

    let status = subscription
        .as_ref()
        .map(|s| s.status.clone())
        .unwrap_or_else(|| "active".to_string());

    Ok(Json(ApiResponse::new(SubscriptionView {
        plan,
        status,
        features: plan_features(plan).iter().map(|f| f.to_string()).collect(),
        subscription,
    })))
}

/// Change the team's plan (owner-only)
pub async fn change_plan(
    State(state): State<AppState>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<ChangePlanRequest>,
) -> ApiResult<Json<ApiResponse<Subscription>>> {
    // Ownership first: API keys (no user) can never manage billing
    let user_id = team.user_id.ok_or(ApiError::OwnerOnly)?;
    require_owner(&state.db, team.team_id, user_id).await?;

    let plan = Plan::parse(&request.plan)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown plan: {}", request.plan)))?;

    let subscription = Subscription::set_plan(&state.db, team.team_id, plan).await?;

    tracing::info!(team_id = %team.team_id, plan = plan.as_str(), "Plan changed");

    Ok(Json(ApiResponse::new(subscription)))
}

/// Per-resource usage against the plan's limits
pub async fn get_usage(
    State(state): State<AppState>,
    Extension(team): Extension<TeamContext>,
) -> ApiResult<Json<ApiResponse<TeamUsage>>> {
    let usage = Entitlements::new(state.db.clone())
        .usage(team.team_id)
        .await?;

    Ok(Json(ApiResponse::new(usage)))
}
