/// Static plan catalog: features and limits per billing plan
///
/// This module is pure configuration plus lookups; no database access.
/// Actions are dotted strings (`"tasks.create"`, `"pages.publish"`), features
/// are the prefix segment (`"tasks"`), and quotas are per-resource row counts.
///
/// # Catalog
///
/// **Free:** tasks, customers; 100 tasks, 50 customers, 3 members.
///
/// **Starter:** + pages, patterns, api_keys; 1,000 tasks, 500 customers,
/// 50 pages, 10 patterns, 10 members, 5 API keys.
///
/// **Pro:** + ai, webhooks; 10,000 tasks, 5,000 customers, 500 pages,
/// 100 patterns, 50 members, 25 API keys.
///
/// **Enterprise:** `*` (all features); every limit -1 (unlimited).
///
/// # Example
///
/// ```
/// use nextspark_shared::billing::plans::{plan_features, limit_for, Resource};
/// use nextspark_shared::models::subscription::Plan;
///
/// assert!(plan_features(Plan::Free).contains(&"tasks"));
/// assert_eq!(plan_features(Plan::Enterprise), &["*"]);
/// assert_eq!(limit_for(Plan::Free, Resource::Tasks), 100);
/// assert_eq!(limit_for(Plan::Enterprise, Resource::Tasks), -1);
/// ```

use crate::models::subscription::Plan;
use crate::models::team_member::TeamRole;

/// Sentinel limit meaning "unlimited"
pub const UNLIMITED: i64 = -1;

/// Countable, quota-limited resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tasks,
    Customers,
    Pages,
    Patterns,
    Members,
    ApiKeys,
}

impl Resource {
    /// Human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Tasks => "tasks",
            Resource::Customers => "customers",
            Resource::Pages => "pages",
            Resource::Patterns => "patterns",
            Resource::Members => "members",
            Resource::ApiKeys => "api_keys",
        }
    }

    /// All resources, for usage summaries
    pub fn all() -> [Resource; 6] {
        [
            Resource::Tasks,
            Resource::Customers,
            Resource::Pages,
            Resource::Patterns,
            Resource::Members,
            Resource::ApiKeys,
        ]
    }
}

/// Feature keys gated by plans
const KNOWN_FEATURES: &[&str] = &[
    "tasks",
    "customers",
    "pages",
    "patterns",
    "api_keys",
    "ai",
    "webhooks",
];

/// Gets the feature list for a plan
///
/// `["*"]` means all features; an empty list would mean no feature access.
pub fn plan_features(plan: Plan) -> &'static [&'static str] {
    match plan {
        Plan::Free => &["tasks", "customers"],
        Plan::Starter => &["tasks", "customers", "pages", "patterns", "api_keys"],
        Plan::Pro => &[
            "tasks",
            "customers",
            "pages",
            "patterns",
            "api_keys",
            "ai",
            "webhooks",
        ],
        Plan::Enterprise => &["*"],
    }
}

/// Gets the quota limit for a resource under a plan
///
/// `-1` means unlimited.
pub fn limit_for(plan: Plan, resource: Resource) -> i64 {
    match plan {
        Plan::Free => match resource {
            Resource::Tasks => 100,
            Resource::Customers => 50,
            Resource::Members => 3,
            Resource::Pages | Resource::Patterns | Resource::ApiKeys => 0,
        },
        Plan::Starter => match resource {
            Resource::Tasks => 1_000,
            Resource::Customers => 500,
            Resource::Pages => 50,
            Resource::Patterns => 10,
            Resource::Members => 10,
            Resource::ApiKeys => 5,
        },
        Plan::Pro => match resource {
            Resource::Tasks => 10_000,
            Resource::Customers => 5_000,
            Resource::Pages => 500,
            Resource::Patterns => 100,
            Resource::Members => 50,
            Resource::ApiKeys => 25,
        },
        Plan::Enterprise => UNLIMITED,
    }
}

/// RBAC table: minimum role per action
///
/// Actions absent from this table are unrestricted at the RBAC layer.
pub fn min_role_for(action: &str) -> Option<TeamRole> {
    let required = match action {
        // Read access for every member
        "tasks.list" | "tasks.read" | "customers.list" | "customers.read" | "pages.list"
        | "pages.read" | "patterns.list" | "patterns.read" | "billing.read" => TeamRole::Viewer,

        // Entity mutation is member-level
        "tasks.create" | "tasks.update" | "tasks.delete" | "customers.create"
        | "customers.update" | "customers.delete" | "pages.create" | "pages.update"
        | "patterns.create" | "patterns.update" | "ai.converse" => TeamRole::Member,

        // Publishing, deleting content, keys, and member management are admin-level
        "pages.publish" | "pages.delete" | "patterns.delete" | "api_keys.create"
        | "api_keys.manage" | "members.manage" => TeamRole::Admin,

        // Billing and team lifecycle belong to the owner
        "billing.manage" | "team.delete" => TeamRole::Owner,

        _ => return None,
    };

    Some(required)
}

/// Maps an action to its gating feature, if any
///
/// The feature is the dotted prefix (`"tasks.create"` → `"tasks"`) when that
/// prefix is a known feature key; actions outside the feature namespace
/// (e.g. `"team.delete"`, `"members.manage"`) are not feature-gated.
pub fn feature_for_action(action: &str) -> Option<&'static str> {
    let prefix = action.split('.').next()?;
    KNOWN_FEATURES.iter().find(|f| **f == prefix).copied()
}

/// Maps an action to the resource whose quota it consumes, if any
///
/// Only creation-class actions count against quotas.
pub fn resource_for_action(action: &str) -> Option<Resource> {
    match action {
        "tasks.create" => Some(Resource::Tasks),
        "customers.create" => Some(Resource::Customers),
        "pages.create" => Some(Resource::Pages),
        "patterns.create" => Some(Resource::Patterns),
        "members.manage" => Some(Resource::Members),
        "api_keys.create" => Some(Resource::ApiKeys),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_features() {
        assert_eq!(plan_features(Plan::Free), &["tasks", "customers"]);
        assert!(plan_features(Plan::Starter).contains(&"pages"));
        assert!(!plan_features(Plan::Starter).contains(&"ai"));
        assert!(plan_features(Plan::Pro).contains(&"ai"));
        assert_eq!(plan_features(Plan::Enterprise), &["*"]);
    }

    #[test]
    fn test_limits() {
        assert_eq!(limit_for(Plan::Free, Resource::Tasks), 100);
        assert_eq!(limit_for(Plan::Free, Resource::Pages), 0);
        assert_eq!(limit_for(Plan::Starter, Resource::ApiKeys), 5);
        assert_eq!(limit_for(Plan::Pro, Resource::Customers), 5_000);
        for resource in Resource::all() {
            assert_eq!(limit_for(Plan::Enterprise, resource), UNLIMITED);
        }
    }

    #[test]
    fn test_min_role_for() {
        assert_eq!(min_role_for("tasks.list"), Some(TeamRole::Viewer));
        assert_eq!(min_role_for("tasks.create"), Some(TeamRole::Member));
        assert_eq!(min_role_for("pages.publish"), Some(TeamRole::Admin));
        assert_eq!(min_role_for("billing.manage"), Some(TeamRole::Owner));

        // Unmapped actions are unrestricted at the RBAC layer
        assert_eq!(min_role_for("health.ping"), None);
    }

    #[test]
    fn test_feature_for_action() {
        assert_eq!(feature_for_action("tasks.create"), Some("tasks"));
        assert_eq!(feature_for_action("ai.converse"), Some("ai"));
        assert_eq!(feature_for_action("api_keys.manage"), Some("api_keys"));

        // Actions outside the feature namespace are not gated
        assert_eq!(feature_for_action("team.delete"), None);
        assert_eq!(feature_for_action("members.manage"), None);
    }

    #[test]
    fn test_resource_for_action() {
        assert_eq!(resource_for_action("tasks.create"), Some(Resource::Tasks));
        assert_eq!(resource_for_action("pages.create"), Some(Resource::Pages));
        assert_eq!(resource_for_action("api_keys.create"), Some(Resource::ApiKeys));
        assert_eq!(resource_for_action("tasks.update"), None);
        assert_eq!(resource_for_action("tasks.delete"), None);
        // Non-creating management actions never hit the quota layer
        assert_eq!(resource_for_action("api_keys.manage"), None);
    }
}
