/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register new user
/// - `POST /api/v1/auth/login` - Login and get tokens
/// - `POST /api/v1/auth/refresh` - Refresh access token
///
/// Registration creates the user plus a personal team with an owner
/// membership, so every account starts with a usable team context.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{extract::State, Json};
use nextspark_shared::{
    auth::{jwt, password},
    content::is_valid_slug,
    models::{
        team::{CreateTeam, Team},
        team_member::{CreateTeamMember, TeamMember, TeamRole},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// Optional team name (defaults to a personal team)
    #[validate(length(max = 100, message = "Team name must be at most 100 characters"))]
    pub team_name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: Uuid,

    /// Personal team ID
    pub team_id: Uuid,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: Uuid,

    /// First team the user belongs to (default context)
    pub default_team_id: Option<Uuid>,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// Creates the account, hashes the password with Argon2id, creates a
/// personal team with the user as owner, and returns a token pair.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<RegisterResponse>>> {
    request.validate()?;

    if User::find_by_email(&state.db, &request.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&request.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: request.email.clone(),
            password_hash,
            name: request.name.clone(),
            avatar_url: None,
        },
    )
    .await?;

    // Personal team: named after the user unless a team name was given
    let team_name = request
        .team_name
        .clone()
        .or_else(|| request.name.clone())
        .unwrap_or_else(|| {
            request
                .email
                .split('@')
                .next()
                .unwrap_or("personal")
                .to_string()
        });

    let team = Team::create(&state.db, CreateTeam {
        name: team_name.clone(),
        slug: unique_team_slug(&team_name, user.id),
    })
    .await?;

    TeamMember::create(
        &state.db,
        CreateTeamMember {
            team_id: team.id,
            user_id: user.id,
            role: TeamRole::Owner,
        },
    )
    .await?;

    let access_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Access), state.jwt_secret())?;
    let refresh_token = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Refresh),
        state.jwt_secret(),
    )?;

    tracing::info!(user_id = %user.id, team_id = %team.id, "User registered");

    Ok(Json(ApiResponse::new(RegisterResponse {
        user_id: user.id,
        team_id: team.id,
        access_token,
        refresh_token,
    })))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    request.validate()?;

    let user = User::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let verified = password::verify_password(&request.password, &user.password_hash)?;
    if !verified {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let teams = Team::list_for_user(&state.db, user.id).await?;

    let access_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Access), state.jwt_secret())?;
    let refresh_token = jwt::create_token(
        &jwt::Claims::new(user.id, jwt::TokenType::Refresh),
        state.jwt_secret(),
    )?;

    Ok(Json(ApiResponse::new(LoginResponse {
        user_id: user.id,
        default_team_id: teams.first().map(|t| t.id),
        access_token,
        refresh_token,
    })))
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<RefreshResponse>>> {
    let claims = jwt::validate_refresh_token(&request.refresh_token, state.jwt_secret())?;

    let access_token = jwt::create_token(
        &jwt::Claims::new(claims.sub, jwt::TokenType::Access),
        state.jwt_secret(),
    )?;

    Ok(Json(ApiResponse::new(RefreshResponse { access_token })))
}

/// Derives a unique, valid team slug from a display name
///
/// The user id suffix makes collisions with other personal teams
/// practically impossible while keeping the slug readable.
fn unique_team_slug(name: &str, user_id: Uuid) -> String {
    let mut base = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            base.push('-');
            last_dash = true;
        }
    }

    while base.ends_with('-') {
        base.pop();
    }

    if base.is_empty() {
        base.push_str("team");
    }

    let suffix = &user_id.simple().to_string()[..8];
    let slug = format!("{}-{}", base, suffix);

    debug_assert!(is_valid_slug(&slug));
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_team_slug_is_valid_and_distinct() {
        let a = unique_team_slug("Acme Corp!", Uuid::new_v4());
        let b = unique_team_slug("Acme Corp!", Uuid::new_v4());

        assert!(a.starts_with("acme-corp-"));
        assert_ne!(a, b);
        assert!(is_valid_slug(&a));
        assert!(is_valid_slug(&unique_team_slug("???", Uuid::new_v4())));
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "longenough".to_string(),
            name: None,
            team_name: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "nope".to_string(),
            password: "longenough".to_string(),
            name: None,
            team_name: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
            name: None,
            team_name: None,
        };
        assert!(short_password.validate().is_err());
    }
}
