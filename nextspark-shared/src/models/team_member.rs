/// Team membership model and database operations
///
/// This module provides the TeamMember model for user-team relationships with RBAC.
/// It implements a many-to-many relationship between users and teams with role-based
/// access control.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('owner', 'admin', 'member', 'viewer');
///
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role team_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: Full control, billing, delete team
/// - **admin**: Manage members, API keys, all entities
/// - **member**: Create and manage entities
/// - **viewer**: Read-only access
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::team_member::{TeamMember, CreateTeamMember, TeamRole};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let member = TeamMember::create(&pool, CreateTeamMember {
///     team_id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
///     role: TeamRole::Admin,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// RBAC roles for team memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full control: billing, delete team, manage all members
    Owner,

    /// Can manage members, API keys, and all entities
    Admin,

    /// Can create and manage entities
    Member,

    /// Read-only access
    Viewer,
}

impl TeamRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
            TeamRole::Viewer => "viewer",
        }
    }

    /// Parses role from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(TeamRole::Owner),
            "admin" => Some(TeamRole::Admin),
            "member" => Some(TeamRole::Member),
            "viewer" => Some(TeamRole::Viewer),
            _ => None,
        }
    }

    /// Checks if this role has at least the permission level of `required`
    ///
    /// Hierarchy: Owner > Admin > Member > Viewer
    pub fn satisfies(&self, required: TeamRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Returns numeric permission level for comparison
    fn permission_level(&self) -> u8 {
        match self {
            TeamRole::Owner => 4,
            TeamRole::Admin => 3,
            TeamRole::Member => 2,
            TeamRole::Viewer => 1,
        }
    }
}

/// Team membership model with role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the team
    pub role: TeamRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamMember {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: TeamRole,
}

fn default_role() -> TeamRole {
    TeamRole::Member
}

impl TeamMember {
    /// Creates a new membership (adds user to team)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Membership already exists (unique constraint violation)
    /// - Team or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateTeamMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING team_id, user_id, role, created_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership by team and user
    pub async fn find(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT team_id, user_id, role, created_at
            FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Checks if a user has access to a team (any role)
    pub async fn has_access(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_members
                WHERE team_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a team
    pub async fn get_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamRole>, sqlx::Error> {
        let role: Option<TeamRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Updates a user's role in a team
    pub async fn update_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members
            SET role = $3
            WHERE team_id = $1 AND user_id = $2
            RETURNING team_id, user_id, role, created_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Deletes a membership (removes user from team)
    pub async fn delete(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
                .bind(team_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all members of a team
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT team_id, user_id, role, created_at
            FROM team_members
            WHERE team_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts members in a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Counts owners in a team
    ///
    /// Used to refuse removing or demoting the last owner.
    pub async fn count_owners(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND role = 'owner'",
        )
        .bind(team_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::Owner.as_str(), "owner");
        assert_eq!(TeamRole::Admin.as_str(), "admin");
        assert_eq!(TeamRole::Member.as_str(), "member");
        assert_eq!(TeamRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_team_role_parse() {
        assert_eq!(TeamRole::parse("owner"), Some(TeamRole::Owner));
        assert_eq!(TeamRole::parse("admin"), Some(TeamRole::Admin));
        assert_eq!(TeamRole::parse("member"), Some(TeamRole::Member));
        assert_eq!(TeamRole::parse("viewer"), Some(TeamRole::Viewer));
        assert_eq!(TeamRole::parse("superuser"), None);
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(TeamRole::Owner.satisfies(TeamRole::Admin));
        assert!(TeamRole::Owner.satisfies(TeamRole::Owner));
        assert!(TeamRole::Admin.satisfies(TeamRole::Member));
        assert!(!TeamRole::Admin.satisfies(TeamRole::Owner));
        assert!(!TeamRole::Member.satisfies(TeamRole::Admin));
        assert!(TeamRole::Viewer.satisfies(TeamRole::Viewer));
        assert!(!TeamRole::Viewer.satisfies(TeamRole::Member));
    }

    #[test]
    fn test_create_member_default_role() {
        assert_eq!(default_role(), TeamRole::Member);
    }
}
