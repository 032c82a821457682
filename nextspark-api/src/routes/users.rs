/// Profile endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/users/me` - Current user profile
/// - `PATCH /api/v1/users/me` - Update profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{extract::State, Extension, Json};
use nextspark_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateUser, User},
};
use serde::Deserialize;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New avatar URL
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

/// Current user profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user_id = auth
        .user_id
        .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(user)))
}

/// Update the current user's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateMeRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    request.validate()?;

    let user_id = auth
        .user_id
        .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            name: request.name,
            avatar_url: request.avatar_url,
            password_hash: None,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(user)))
}
