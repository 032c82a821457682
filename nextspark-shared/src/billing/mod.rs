/// Billing: plan catalog and the three-layer entitlement evaluator
///
/// Access to an action is the conjunction of three independent facts:
///
/// ```text
/// allowed = hasPermission(role, action)   -- RBAC table
///       AND hasFeature(plan, action)      -- plan feature list ("*" = all)
///       AND withinQuota(usage, limit)     -- -1 = unlimited
/// ```
///
/// - `plans`: static plan catalog (features and limits per plan)
/// - `entitlement`: the evaluator combining RBAC, features, and quotas

pub mod entitlement;
pub mod plans;

pub use entitlement::{EntitlementError, Entitlements, QuotaStatus, TeamUsage};
pub use plans::{feature_for_action, limit_for, min_role_for, plan_features, Resource};
