/// Team and membership management endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/teams` - Create team
/// - `GET /api/v1/teams` - List the caller's teams
/// - `GET /api/v1/teams/:id` - Get team
/// - `PATCH /api/v1/teams/:id` - Update team (slug changes owner-only)
/// - `DELETE /api/v1/teams/:id` - Delete team (owner-only)
/// - `GET /api/v1/teams/:id/members` - List members
/// - `POST /api/v1/teams/:id/members` - Add member
/// - `PATCH /api/v1/teams/:id/members/:user_id` - Change role
/// - `DELETE /api/v1/teams/:id/members/:user_id` - Remove member
///
/// # Error codes
///
/// Owner-only operations check ownership *before* the generic role gate, so
/// a non-owner admin gets `OWNER_ONLY` instead of a misleading
/// `PERMISSION_DENIED`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use nextspark_shared::{
    auth::{
        authorization::{require_membership, require_owner, require_role},
        middleware::AuthContext,
    },
    billing::entitlement::Entitlements,
    content::is_valid_slug,
    models::{
        team::{CreateTeam, Team, UpdateTeam},
        team_member::{CreateTeamMember, TeamMember, TeamRole},
        user::User,
    },
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// URL-safe slug
    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    pub slug: String,
}

/// Update team request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New slug (owner-only)
    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    pub slug: Option<String>,

    /// Settings patch (merged)
    pub settings: Option<JsonValue>,
}

/// Add member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role to grant (defaults to member)
    pub role: Option<String>,
}

/// Change role request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role
    pub role: String,
}

fn auth_user(auth: &AuthContext) -> ApiResult<Uuid> {
    auth.user_id
        .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))
}

fn parse_role(raw: &str) -> ApiResult<TeamRole> {
    TeamRole::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {}", raw)))
}

/// Create a new team owned by the caller
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Json<ApiResponse<Team>>> {
    request.validate()?;
    let user_id = auth_user(&auth)?;

    if !is_valid_slug(&request.slug) {
        return Err(ApiError::BadRequest(
            "Slug must be lowercase kebab-case (a-z, 0-9, dashes)".to_string(),
        ));
    }

    if Team::find_by_slug(&state.db, &request.slug).await?.is_some() {
        return Err(ApiError::Conflict("Slug already taken".to_string()));
    }

    let team = Team::create(
        &state.db,
        CreateTeam {
            name: request.name,
            slug: request.slug,
        },
    )
    .await?;

    TeamMember::create(
        &state.db,
        CreateTeamMember {
            team_id: team.id,
            user_id,
            role: TeamRole::Owner,
        },
    )
    .await?;

    tracing::info!(team_id = %team.id, user_id = %user_id, "Team created");

    Ok(Json(ApiResponse::new(team)))
}

/// List the caller's teams
pub async fn list_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<Vec<Team>>>> {
    let user_id = auth_user(&auth)?;
    let teams = Team::list_for_user(&state.db, user_id).await?;

    Ok(Json(ApiResponse::new(teams)))
}

/// Get a team the caller belongs to
pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Team>>> {
    let user_id = auth_user(&auth)?;
    require_membership(&state.db, team_id, user_id).await?;

    let team = Team::find_by_id(&state.db, team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(ApiResponse::new(team)))
}

/// Update a team
///
/// Slug changes are owner-only; other fields need admin. The owner check
/// runs first so non-owners see `OWNER_ONLY` for slug changes.
pub async fn update_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<UpdateTeamRequest>,
) -> ApiResult<Json<ApiResponse<Team>>> {
    request.validate()?;
    let user_id = auth_user(&auth)?;

    let update = UpdateTeam {
        name: request.name,
        slug: request.slug,
        settings: request.settings,
    };

    // Ownership before generic permission, for the precise error
    if update.touches_owner_only_fields() {
        require_owner(&state.db, team_id, user_id).await?;
    } else {
        require_role(&state.db, team_id, user_id, TeamRole::Admin).await?;
    }

    if let Some(ref slug) = update.slug {
        if !is_valid_slug(slug) {
            return Err(ApiError::BadRequest(
                "Slug must be lowercase kebab-case (a-z, 0-9, dashes)".to_string(),
            ));
        }
        if let Some(existing) = Team::find_by_slug(&state.db, slug).await? {
            if existing.id != team_id {
                return Err(ApiError::Conflict("Slug already taken".to_string()));
            }
        }
    }

    let team = Team::update(&state.db, team_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(ApiResponse::new(team)))
}

/// Delete a team (owner-only; cascades to all team data)
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    let user_id = auth_user(&auth)?;
    require_owner(&state.db, team_id, user_id).await?;

    let deleted = Team::delete(&state.db, team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    tracing::info!(team_id = %team_id, user_id = %user_id, "Team deleted");

    Ok(Json(ApiResponse::new(true)))
}

/// List members of a team
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<TeamMember>>>> {
    let user_id = auth_user(&auth)?;
    require_membership(&state.db, team_id, user_id).await?;

    let members = TeamMember::list_by_team(&state.db, team_id).await?;

    Ok(Json(ApiResponse::new(members)))
}

/// Add a member to a team
///
/// Granting the owner role is itself owner-only; adding at any other role
/// needs admin. The member quota is enforced against the team's plan.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Json<ApiResponse<TeamMember>>> {
    request.validate()?;
    let user_id = auth_user(&auth)?;

    let role = match request.role.as_deref() {
        Some(raw) => parse_role(raw)?,
        None => TeamRole::Member,
    };

    let caller_role = if role == TeamRole::Owner {
        require_owner(&state.db, team_id, user_id).await?;
        TeamRole::Owner
    } else {
        require_role(&state.db, team_id, user_id, TeamRole::Admin).await?
    };

    Entitlements::new(state.db.clone())
        .enforce(team_id, caller_role, "members.manage")
        .await?;

    let invited = User::find_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user with that email".to_string()))?;

    if TeamMember::find(&state.db, team_id, invited.id).await?.is_some() {
        return Err(ApiError::Conflict("User is already a member".to_string()));
    }

    let member = TeamMember::create(
        &state.db,
        CreateTeamMember {
            team_id,
            user_id: invited.id,
            role,
        },
    )
    .await?;

    Ok(Json(ApiResponse::new(member)))
}

/// Change a member's role
///
/// Granting or revoking the owner role is owner-only; the last owner can
/// never be demoted.
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<ApiResponse<TeamMember>>> {
    let user_id = auth_user(&auth)?;
    let new_role = parse_role(&request.role)?;

    let current = TeamMember::find(&state.db, team_id, member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    let touches_owner = new_role == TeamRole::Owner || current.role == TeamRole::Owner;
    if touches_owner {
        require_owner(&state.db, team_id, user_id).await?;
    } else {
        require_role(&state.db, team_id, user_id, TeamRole::Admin).await?;
    }

    // Never leave a team ownerless
    if current.role == TeamRole::Owner && new_role != TeamRole::Owner {
        let owners = TeamMember::count_owners(&state.db, team_id).await?;
        if owners <= 1 {
            return Err(ApiError::Conflict(
                "Cannot demote the last owner".to_string(),
            ));
        }
    }

    let member = TeamMember::update_role(&state.db, team_id, member_id, new_role)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    Ok(Json(ApiResponse::new(member)))
}

/// Remove a member from a team
///
/// Members may remove themselves; removing anyone else needs admin, and
/// removing an owner is owner-only. The last owner cannot be removed.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    let user_id = auth_user(&auth)?;

    let current = TeamMember::find(&state.db, team_id, member_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    if current.role == TeamRole::Owner {
        require_owner(&state.db, team_id, user_id).await?;

        let owners = TeamMember::count_owners(&state.db, team_id).await?;
        if owners <= 1 {
            return Err(ApiError::Conflict(
                "Cannot remove the last owner".to_string(),
            ));
        }
    } else if member_id != user_id {
        require_role(&state.db, team_id, user_id, TeamRole::Admin).await?;
    } else {
        require_membership(&state.db, team_id, user_id).await?;
    }

    let removed = TeamMember::delete(&state.db, team_id, member_id).await?;

    Ok(Json(ApiResponse::new(removed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert!(parse_role("admin").is_ok());
        assert!(parse_role("owner").is_ok());
        assert!(matches!(parse_role("root"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_create_team_request_validation() {
        let valid = CreateTeamRequest {
            name: "Acme".to_string(),
            slug: "acme".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateTeamRequest {
            name: "".to_string(),
            slug: "acme".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }
}
