/// Pattern CRUD endpoints (team-scoped)
///
/// # Endpoints
///
/// - `GET /api/v1/patterns` - List patterns
/// - `POST /api/v1/patterns` - Create pattern (content validated)
/// - `GET /api/v1/patterns/:id` - Get pattern
/// - `PATCH /api/v1/patterns/:id` - Update pattern
/// - `GET /api/v1/patterns/:id/usages` - Which entities reference it
/// - `DELETE /api/v1/patterns/:id` - Delete pattern (usage rows cascade)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::{ApiResponse, Meta},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use nextspark_shared::{
    auth::{authorization::require_scope, middleware::AuthContext},
    billing::entitlement::Entitlements,
    content::{is_valid_slug, validate_tree},
    models::{
        pattern::{CreatePattern, Pattern, UpdatePattern},
        pattern_usage::PatternUsage,
    },
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

/// Create pattern request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePatternRequest {
    /// Pattern title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// URL-safe slug, unique per team
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: String,

    /// Block tree (defaults to empty)
    pub content: Option<JsonValue>,
}

/// Update pattern request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePatternRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New slug
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: Option<String>,

    /// New block tree
    pub content: Option<JsonValue>,
}

/// List patterns in the team
pub async fn list_patterns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ApiResponse<Vec<Pattern>>>> {
    require_scope(&auth, "patterns:read")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "patterns.list")
        .await?;

    let limit = page.limit();
    let offset = page.offset();

    let patterns = Pattern::list_by_team(&state.db, team.team_id, limit, offset).await?;
    let total = Pattern::count_by_team(&state.db, team.team_id).await?;

    Ok(Json(ApiResponse::with_meta(
        patterns,
        Meta {
            total,
            limit,
            offset,
        },
    )))
}

/// Create a pattern
pub async fn create_pattern(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<CreatePatternRequest>,
) -> ApiResult<Json<ApiResponse<Pattern>>> {
    request.validate()?;
    require_scope(&auth, "patterns:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "patterns.create")
        .await?;

    if !is_valid_slug(&request.slug) {
        return Err(ApiError::BadRequest(
            "Slug must be lowercase kebab-case (a-z, 0-9, dashes)".to_string(),
        ));
    }

    let content = request.content.unwrap_or_else(|| json!([]));
    validate_tree(&content)?;

    let pattern = Pattern::create(
        &state.db,
        CreatePattern {
            team_id: team.team_id,
            author_id: team.user_id,
            title: request.title,
            slug: request.slug,
            content,
        },
    )
    .await?;

    state.dispatch_webhook("pattern", "created", pattern.id, team.team_id, json!(pattern));

    Ok(Json(ApiResponse::new(pattern)))
}

/// Get a pattern
pub async fn get_pattern(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(pattern_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Pattern>>> {
    require_scope(&auth, "patterns:read")?;

    let pattern = Pattern::find_by_id_and_team(&state.db, pattern_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pattern not found".to_string()))?;

    Ok(Json(ApiResponse::new(pattern)))
}

/// Update a pattern
pub async fn update_pattern(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(pattern_id): Path<Uuid>,
    Json(request): Json<UpdatePatternRequest>,
) -> ApiResult<Json<ApiResponse<Pattern>>> {
    request.validate()?;
    require_scope(&auth, "patterns:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "patterns.update")
        .await?;

    if let Some(ref slug) = request.slug {
        if !is_valid_slug(slug) {
            return Err(ApiError::BadRequest(
                "Slug must be lowercase kebab-case (a-z, 0-9, dashes)".to_string(),
            ));
        }
    }

    if let Some(ref content) = request.content {
        validate_tree(content)?;
    }

    let pattern = Pattern::update(
        &state.db,
        pattern_id,
        team.team_id,
        UpdatePattern {
            title: request.title,
            slug: request.slug,
            content: request.content,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Pattern not found".to_string()))?;

    state.dispatch_webhook("pattern", "updated", pattern.id, team.team_id, json!(pattern));

    Ok(Json(ApiResponse::new(pattern)))
}

/// List the entities referencing a pattern
pub async fn list_pattern_usages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(pattern_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<PatternUsage>>>> {
    require_scope(&auth, "patterns:read")?;

    // 404 for patterns outside the team, before leaking usage info
    Pattern::find_by_id_and_team(&state.db, pattern_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pattern not found".to_string()))?;

    let usages = PatternUsage::list_by_pattern(&state.db, pattern_id, team.team_id).await?;

    Ok(Json(ApiResponse::new(usages)))
}

/// Delete a pattern
///
/// Usage rows cascade away with the pattern; pages referencing it keep the
/// dangling block, which the theme layer renders as empty.
pub async fn delete_pattern(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(pattern_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    require_scope(&auth, "patterns:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "patterns.delete")
        .await?;

    let deleted = Pattern::delete(&state.db, pattern_id, team.team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Pattern not found".to_string()));
    }

    state.dispatch_webhook(
        "pattern",
        "deleted",
        pattern_id,
        team.team_id,
        json!({"id": pattern_id}),
    );

    Ok(Json(ApiResponse::new(true)))
}
