/// Page CRUD endpoints (team-scoped)
///
/// # Endpoints
///
/// - `GET /api/v1/pages` - List pages
/// - `POST /api/v1/pages` - Create page (content validated)
/// - `GET /api/v1/pages/:id` - Get page
/// - `PATCH /api/v1/pages/:id` - Update page (content validated)
/// - `POST /api/v1/pages/:id/publish` - Publish page
/// - `DELETE /api/v1/pages/:id` - Delete page
///
/// Content saves validate the block tree against the registry and then run
/// the best-effort pattern-usage tracker; tracker failures never surface.

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
    content::{
        is_valid_slug,
        usage::{clear_entity_usages, sync_entity_usages},
        validate_tree,
    },
    models::page::{CreatePage, Page, UpdatePage},
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

/// Entity type recorded in pattern_usages rows for pages
const ENTITY_TYPE: &str = "page";

/// Create page request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePageRequest {
    /// Page title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// URL-safe slug, unique per team
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: String,

    /// Block tree (defaults to empty)
    pub content: Option<JsonValue>,
}

/// Update page request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePageRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New slug
    #[validate(length(min = 1, max = 255, message = "Slug must be 1-255 characters"))]
    pub slug: Option<String>,

    /// New block tree
    pub content: Option<JsonValue>,
}

fn check_slug(slug: &str) -> ApiResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Slug must be lowercase kebab-case (a-z, 0-9, dashes)".to_string(),
        ))
    }
}

/// List pages in the team
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ApiResponse<Vec<Page>>>> {
    require_scope(&auth, "pages:read")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "pages.list")
        .await?;

    let limit = page.limit();
    let offset = page.offset();

    let pages = Page::list_by_team(&state.db, team.team_id, limit, offset).await?;
    let total = Page::count_by_team(&state.db, team.team_id).await?;

    Ok(Json(ApiResponse::with_meta(
        pages,
        Meta {
            total,
            limit,
            offset,
        },
    )))
}

/// Create a page in draft state
pub async fn create_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<CreatePageRequest>,
) -> ApiResult<Json<ApiResponse<Page>>> {
    request.validate()?;
    require_scope(&auth, "pages:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "pages.create")
        .await?;

    check_slug(&request.slug)?;

    let content = request.content.unwrap_or_else(|| json!([]));
    validate_tree(&content)?;

    if Page::find_by_slug(&state.db, team.team_id, &request.slug).await?.is_some() {
        return Err(ApiError::Conflict("Slug already taken".to_string()));
    }

    let page = Page::create(
        &state.db,
        CreatePage {
            team_id: team.team_id,
            author_id: team.user_id,
            title: request.title,
            slug: request.slug,
            content,
        },
    )
    .await?;

    // Best-effort; a tracker failure never fails the save
    sync_entity_usages(&state.db, team.team_id, ENTITY_TYPE, page.id, &page.content).await;

    state.dispatch_webhook("page", "created", page.id, team.team_id, json!(page));

    Ok(Json(ApiResponse::new(page)))
}

/// Get a page
pub async fn get_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Page>>> {
    require_scope(&auth, "pages:read")?;

    let page = Page::find_by_id_and_team(&state.db, page_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    Ok(Json(ApiResponse::new(page)))
}

/// Update a page
pub async fn update_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(page_id): Path<Uuid>,
    Json(request): Json<UpdatePageRequest>,
) -> ApiResult<Json<ApiResponse<Page>>> {
    request.validate()?;
    require_scope(&auth, "pages:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "pages.update")
        .await?;

    if let Some(ref slug) = request.slug {
        check_slug(slug)?;
        if let Some(existing) = Page::find_by_slug(&state.db, team.team_id, slug).await? {
            if existing.id != page_id {
                return Err(ApiError::Conflict("Slug already taken".to_string()));
            }
        }
    }

    if let Some(ref content) = request.content {
        validate_tree(content)?;
    }

    let content_changed = request.content.is_some();

    let page = Page::update(
        &state.db,
        page_id,
        team.team_id,
        UpdatePage {
            title: request.title,
            slug: request.slug,
            content: request.content,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    if content_changed {
        sync_entity_usages(&state.db, team.team_id, ENTITY_TYPE, page.id, &page.content).await;
    }

    state.dispatch_webhook("page", "updated", page.id, team.team_id, json!(page));

    Ok(Json(ApiResponse::new(page)))
}

/// Publish a page
pub async fn publish_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Page>>> {
    require_scope(&auth, "pages:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "pages.publish")
        .await?;

    let page = Page::publish(&state.db, page_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    state.dispatch_webhook("page", "published", page.id, team.team_id, json!(page));

    Ok(Json(ApiResponse::new(page)))
}

/// Delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(page_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    require_scope(&auth, "pages:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "pages.delete")
        .await?;

    let deleted = Page::delete(&state.db, page_id, team.team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Page not found".to_string()));
    }

    clear_entity_usages(&state.db, ENTITY_TYPE, page_id).await;

    state.dispatch_webhook("page", "deleted", page_id, team.team_id, json!({"id": page_id}));

    Ok(Json(ApiResponse::new(true)))
}
