/// Three-layer entitlement evaluator
///
/// Combines three independent boolean facts for a `(role, plan, action)`
/// triple and ANDs them:
///
/// 1. **RBAC**: role satisfies the action's minimum role (unmapped actions
///    pass).
/// 2. **Feature**: the plan's feature list contains the action's feature
///    (`"*"` grants all; an empty list grants none; actions with no feature
///    mapping pass).
/// 3. **Quota**: the team's current row count for the action's resource is
///    below the plan limit (`-1` = unlimited; non-creating actions pass).
///
/// The pure layer functions (`rbac_allows`, `plan_allows`, `within_quota`)
/// are separated from the database-backed `Entitlements` service so the
/// truth table is unit-testable without a pool.
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::billing::entitlement::Entitlements;
/// use nextspark_shared::models::team_member::TeamRole;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, team_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let entitlements = Entitlements::new(pool);
///
/// // Returns a typed error naming the failing layer
/// entitlements.enforce(team_id, TeamRole::Member, "tasks.create").await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::plans::{
    feature_for_action, limit_for, min_role_for, plan_features, resource_for_action, Resource,
    UNLIMITED,
};
use crate::models::subscription::{Plan, Subscription};
use crate::models::team_member::TeamRole;

/// Entitlement evaluation error
#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    /// RBAC layer denied the action
    #[error("Role {role:?} may not perform {action}")]
    PermissionDenied { action: String, role: TeamRole },

    /// Feature layer denied the action
    #[error("Plan {plan:?} does not include the {feature} feature")]
    FeatureNotAvailable {
        action: String,
        plan: Plan,
        feature: &'static str,
    },

    /// Quota layer denied the action
    #[error("{resource} quota exceeded ({current}/{limit})")]
    QuotaExceeded {
        resource: &'static str,
        current: i64,
        limit: i64,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Quota state for one resource
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuotaStatus {
    /// Resource name
    pub resource: &'static str,

    /// Current row count for the team
    pub current: i64,

    /// Plan limit (-1 = unlimited)
    pub limit: i64,
}

impl QuotaStatus {
    /// Whether the team can add one more row of this resource
    pub fn within(&self) -> bool {
        within_quota(self.limit, self.current)
    }
}

/// Usage summary across all quota-limited resources
#[derive(Debug, Clone, serde::Serialize)]
pub struct TeamUsage {
    /// Effective plan the summary was computed against
    pub plan: Plan,

    /// Per-resource quota state
    pub resources: Vec<QuotaStatus>,
}

/// RBAC layer: does the role permit the action?
///
/// Actions absent from the permission table are unrestricted.
pub fn rbac_allows(role: TeamRole, action: &str) -> bool {
    match min_role_for(action) {
        Some(required) => role.satisfies(required),
        None => true,
    }
}

/// Feature layer: does the plan include the action's feature?
///
/// `"*"` grants all features; an action with no feature mapping passes.
pub fn plan_allows(plan: Plan, action: &str) -> bool {
    let feature = match feature_for_action(action) {
        Some(feature) => feature,
        None => return true,
    };

    features_allow(plan_features(plan), feature)
}

/// Feature list membership: `"*"` grants all, an empty list grants none
pub fn features_allow(features: &[&str], feature: &str) -> bool {
    features.iter().any(|f| *f == "*" || *f == feature)
}

/// Quota layer: is the current usage below the limit?
///
/// A limit of `-1` means unlimited.
pub fn within_quota(limit: i64, usage: i64) -> bool {
    limit == UNLIMITED || usage < limit
}

/// Database-backed entitlement service
///
/// Resolves the team's plan from its subscription row and current usage from
/// `COUNT(*)` queries, then applies the three pure layers.
pub struct Entitlements {
    db: PgPool,
}

impl Entitlements {
    /// Creates a new entitlement service
    pub fn new(db: PgPool) -> Self {
        Entitlements { db }
    }

    /// Enforces all three layers for an action
    ///
    /// Layers are evaluated in order (RBAC, feature, quota) so the error
    /// names the first layer that denied.
    ///
    /// # Errors
    ///
    /// - `EntitlementError::PermissionDenied` from the RBAC layer
    /// - `EntitlementError::FeatureNotAvailable` from the feature layer
    /// - `EntitlementError::QuotaExceeded` from the quota layer
    pub async fn enforce(
        &self,
        team_id: Uuid,
        role: TeamRole,
        action: &str,
    ) -> Result<(), EntitlementError> {
        if !rbac_allows(role, action) {
            return Err(EntitlementError::PermissionDenied {
                action: action.to_string(),
                role,
            });
        }

        let plan = Subscription::plan_for_team(&self.db, team_id).await?;

        if !plan_allows(plan, action) {
            // feature_for_action is Some here, otherwise plan_allows passes
            let feature = feature_for_action(action).unwrap_or("unknown");
            return Err(EntitlementError::FeatureNotAvailable {
                action: action.to_string(),
                plan,
                feature,
            });
        }

        if let Some(resource) = resource_for_action(action) {
            let limit = limit_for(plan, resource);
            let current = self.count(team_id, resource).await?;

            if !within_quota(limit, current) {
                return Err(EntitlementError::QuotaExceeded {
                    resource: resource.as_str(),
                    current,
                    limit,
                });
            }
        }

        Ok(())
    }

    /// Computes the usage summary for a team across all resources
    pub async fn usage(&self, team_id: Uuid) -> Result<TeamUsage, EntitlementError> {
        let plan = Subscription::plan_for_team(&self.db, team_id).await?;

        let mut resources = Vec::with_capacity(Resource::all().len());
        for resource in Resource::all() {
            let current = self.count(team_id, resource).await?;
            resources.push(QuotaStatus {
                resource: resource.as_str(),
                current,
                limit: limit_for(plan, resource),
            });
        }

        Ok(TeamUsage { plan, resources })
    }

    /// Counts current rows for a resource within a team
    async fn count(&self, team_id: Uuid, resource: Resource) -> Result<i64, sqlx::Error> {
        let query = match resource {
            Resource::Tasks => "SELECT COUNT(*) FROM tasks WHERE team_id = $1",
            Resource::Customers => "SELECT COUNT(*) FROM customers WHERE team_id = $1",
            Resource::Pages => "SELECT COUNT(*) FROM pages WHERE team_id = $1",
            Resource::Patterns => "SELECT COUNT(*) FROM patterns WHERE team_id = $1",
            Resource::Members => "SELECT COUNT(*) FROM team_members WHERE team_id = $1",
            Resource::ApiKeys => {
                "SELECT COUNT(*) FROM api_keys WHERE team_id = $1 AND revoked = FALSE"
            }
        };

        let count: i64 = sqlx::query_scalar(query)
            .bind(team_id)
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbac_layer() {
        assert!(rbac_allows(TeamRole::Member, "tasks.create"));
        assert!(!rbac_allows(TeamRole::Viewer, "tasks.create"));
        assert!(rbac_allows(TeamRole::Viewer, "tasks.list"));
        assert!(rbac_allows(TeamRole::Owner, "billing.manage"));
        assert!(!rbac_allows(TeamRole::Admin, "billing.manage"));

        // Unmapped actions fall through to allowed
        assert!(rbac_allows(TeamRole::Viewer, "made.up"));
    }

    #[test]
    fn test_feature_layer() {
        assert!(plan_allows(Plan::Free, "tasks.create"));
        assert!(!plan_allows(Plan::Free, "pages.create"));
        assert!(!plan_allows(Plan::Starter, "ai.converse"));
        assert!(plan_allows(Plan::Pro, "ai.converse"));

        // Wildcard grants everything
        assert!(plan_allows(Plan::Enterprise, "pages.create"));
        assert!(plan_allows(Plan::Enterprise, "ai.converse"));

        // Actions with no feature mapping pass
        assert!(plan_allows(Plan::Free, "team.delete"));
    }

    #[test]
    fn test_feature_list_semantics() {
        // Wildcard grants everything
        assert!(features_allow(&["*"], "anything"));

        // Empty list grants nothing
        assert!(!features_allow(&[], "tasks"));

        // Plain membership
        assert!(features_allow(&["tasks", "pages"], "pages"));
        assert!(!features_allow(&["tasks", "pages"], "ai"));
    }

    #[test]
    fn test_quota_layer() {
        assert!(within_quota(10, 9));
        assert!(!within_quota(10, 10));
        assert!(!within_quota(10, 11));
        assert!(!within_quota(0, 0));

        // -1 means unlimited
        assert!(within_quota(UNLIMITED, 0));
        assert!(within_quota(UNLIMITED, i64::MAX));
    }

    #[test]
    fn test_three_layers_are_independent() {
        // RBAC passes, feature denies
        assert!(rbac_allows(TeamRole::Owner, "pages.create"));
        assert!(!plan_allows(Plan::Free, "pages.create"));

        // Feature passes, RBAC denies
        assert!(plan_allows(Plan::Pro, "pages.publish"));
        assert!(!rbac_allows(TeamRole::Member, "pages.publish"));
    }

    #[test]
    fn test_quota_status_within() {
        let status = QuotaStatus {
            resource: "tasks",
            current: 100,
            limit: 100,
        };
        assert!(!status.within());

        let unlimited = QuotaStatus {
            resource: "tasks",
            current: 100,
            limit: UNLIMITED,
        };
        assert!(unlimited.within());
    }
}
