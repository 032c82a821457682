/// Subscription model and database operations
///
/// This module provides the Subscription model tying a team to a billing plan.
/// A team without a subscription row (or with a canceled one) is treated as
/// being on the `free` plan.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subscriptions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL UNIQUE REFERENCES teams(id) ON DELETE CASCADE,
///     plan VARCHAR(50) NOT NULL DEFAULT 'free',
///     status VARCHAR(50) NOT NULL DEFAULT 'active',
///     external_customer_id VARCHAR(255),
///     external_subscription_id VARCHAR(255),
///     current_period_end TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT subscriptions_plan_check CHECK (
///         plan IN ('free', 'starter', 'pro', 'enterprise')
///     ),
///     CONSTRAINT subscriptions_status_check CHECK (
///         status IN ('trialing', 'active', 'past_due', 'canceled')
///     )
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::subscription::{Subscription, Plan};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let team_id = Uuid::new_v4();
///
/// // Upgrade the team
/// Subscription::set_plan(&pool, team_id, Plan::Pro).await?;
///
/// // Resolve the effective plan (free when no row exists)
/// let plan = Subscription::plan_for_team(&pool, team_id).await?;
/// assert_eq!(plan, Plan::Pro);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Billing plan types
///
/// Plans determine features and quotas via the billing catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Free plan (default, no subscription row required)
    Free,

    /// Starter plan (entry paid tier)
    Starter,

    /// Professional plan (full feature set)
    Pro,

    /// Enterprise plan (all features, unlimited quotas)
    Enterprise,
}

impl Plan {
    /// Converts plan to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    /// Parses plan from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Plan::Free),
            "starter" => Some(Plan::Starter),
            "pro" => Some(Plan::Pro),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }
}

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Trial period, full plan access
    Trialing,

    /// Paid and current
    Active,

    /// Payment failed, plan access retained pending retry
    PastDue,

    /// Canceled, team falls back to the free plan
    Canceled,
}

impl SubscriptionStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Parses status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trialing" => Some(SubscriptionStatus::Trialing),
            "active" => Some(SubscriptionStatus::Active),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" => Some(SubscriptionStatus::Canceled),
            _ => None,
        }
    }

    /// Whether the subscription still grants its plan's entitlements
    pub fn grants_plan(&self) -> bool {
        !matches!(self, SubscriptionStatus::Canceled)
    }
}

/// Subscription model linking a team to a billing plan
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    /// Unique subscription ID
    pub id: Uuid,

    /// Team this subscription belongs to (one per team)
    pub team_id: Uuid,

    /// Current plan ("free", "starter", "pro", "enterprise")
    pub plan: String,

    /// Lifecycle status ("trialing", "active", "past_due", "canceled")
    pub status: String,

    /// Payment-provider customer reference
    pub external_customer_id: Option<String>,

    /// Payment-provider subscription reference
    pub external_subscription_id: Option<String>,

    /// End of the current billing period
    pub current_period_end: Option<DateTime<Utc>>,

    /// When the subscription was created
    pub created_at: DateTime<Utc>,

    /// When the subscription was last updated
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Gets the parsed plan enum
    pub fn get_plan(&self) -> Option<Plan> {
        Plan::parse(&self.plan)
    }

    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<SubscriptionStatus> {
        SubscriptionStatus::parse(&self.status)
    }

    /// Finds the subscription for a team
    pub async fn find_by_team(pool: &PgPool, team_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, team_id, plan, status, external_customer_id,
                   external_subscription_id, current_period_end, created_at, updated_at
            FROM subscriptions
            WHERE team_id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Resolves the effective plan for a team
    ///
    /// Falls back to `Plan::Free` when the team has no subscription row, the
    /// stored plan is unrecognized, or the subscription is canceled.
    pub async fn plan_for_team(pool: &PgPool, team_id: Uuid) -> Result<Plan, sqlx::Error> {
        let subscription = Self::find_by_team(pool, team_id).await?;

        let plan = match subscription {
            Some(sub) => {
                let status = sub.get_status().unwrap_or(SubscriptionStatus::Canceled);
                if status.grants_plan() {
                    sub.get_plan().unwrap_or(Plan::Free)
                } else {
                    Plan::Free
                }
            }
            None => Plan::Free,
        };

        Ok(plan)
    }

    /// Sets a team's plan, creating the subscription row if needed
    ///
    /// A plan change reactivates a canceled subscription.
    pub async fn set_plan(pool: &PgPool, team_id: Uuid, plan: Plan) -> Result<Self, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (team_id, plan, status)
            VALUES ($1, $2, 'active')
            ON CONFLICT (team_id)
            DO UPDATE SET plan = EXCLUDED.plan, status = 'active', updated_at = NOW()
            RETURNING id, team_id, plan, status, external_customer_id,
                      external_subscription_id, current_period_end, created_at, updated_at
            "#,
        )
        .bind(team_id)
        .bind(plan.as_str())
        .fetch_one(pool)
        .await?;

        Ok(subscription)
    }

    /// Updates the lifecycle status of a team's subscription
    pub async fn set_status(
        pool: &PgPool,
        team_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = $2, updated_at = NOW()
            WHERE team_id = $1
            RETURNING id, team_id, plan, status, external_customer_id,
                      external_subscription_id, current_period_end, created_at, updated_at
            "#,
        )
        .bind(team_id)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Records payment-provider references on a team's subscription
    pub async fn set_external_refs(
        pool: &PgPool,
        team_id: Uuid,
        customer_id: &str,
        subscription_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET external_customer_id = $2,
                external_subscription_id = $3,
                updated_at = NOW()
            WHERE team_id = $1
            RETURNING id, team_id, plan, status, external_customer_id,
                      external_subscription_id, current_period_end, created_at, updated_at
            "#,
        )
        .bind(team_id)
        .bind(customer_id)
        .bind(subscription_id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_as_str() {
        assert_eq!(Plan::Free.as_str(), "free");
        assert_eq!(Plan::Starter.as_str(), "starter");
        assert_eq!(Plan::Pro.as_str(), "pro");
        assert_eq!(Plan::Enterprise.as_str(), "enterprise");
    }

    #[test]
    fn test_plan_parse() {
        assert_eq!(Plan::parse("free"), Some(Plan::Free));
        assert_eq!(Plan::parse("starter"), Some(Plan::Starter));
        assert_eq!(Plan::parse("pro"), Some(Plan::Pro));
        assert_eq!(Plan::parse("enterprise"), Some(Plan::Enterprise));
        assert_eq!(Plan::parse("platinum"), None);
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            SubscriptionStatus::Trialing,
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_grants_plan() {
        assert!(SubscriptionStatus::Trialing.grants_plan());
        assert!(SubscriptionStatus::Active.grants_plan());
        assert!(SubscriptionStatus::PastDue.grants_plan());
        assert!(!SubscriptionStatus::Canceled.grants_plan());
    }
}
