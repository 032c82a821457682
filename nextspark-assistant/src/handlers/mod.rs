/// Per-entity handler nodes
///
/// Each handler receives a structured intent, normalizes enum-like string
/// parameters, and calls the corresponding CRUD model. There is exactly one
/// error boundary per handler: the inner `run` returns `anyhow::Result` and
/// the public `handle` converts any error into a failed [`HandlerOutcome`].
///
/// Handlers never decide permissions; the conversations route enforces the
/// entitlement gate before the orchestrator runs.

pub mod customer;
pub mod page;
pub mod task;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Team/user context a conversation runs in
#[derive(Debug, Clone, Copy)]
pub struct ConversationContext {
    /// Team every CRUD call is scoped to
    pub team_id: Uuid,

    /// Acting user, when authenticated via JWT
    pub user_id: Option<Uuid>,
}

/// Uniform handler result consumed by the response formatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerOutcome {
    /// Whether the requested operation happened
    pub success: bool,

    /// Human-readable summary of what happened
    pub message: String,

    /// Error detail when success is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Entity data produced by the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl HandlerOutcome {
    /// Successful outcome with a summary and optional data
    pub fn ok(message: impl Into<String>, data: Option<JsonValue>) -> Self {
        HandlerOutcome {
            success: true,
            message: message.into(),
            error: None,
            data,
        }
    }

    /// Failed outcome with a summary and error detail
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        HandlerOutcome {
            success: false,
            message: message.into(),
            error: Some(error.into()),
            data: None,
        }
    }

    /// Converts a fallible handler body into a uniform outcome
    pub fn from_result(result: anyhow::Result<HandlerOutcome>, operation: &str) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(operation, error = %e, "Assistant handler failed");
                HandlerOutcome::failure(
                    format!("Sorry, I couldn't complete that {} request.", operation),
                    e.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_shapes() {
        let ok = HandlerOutcome::ok("Done", None);
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = HandlerOutcome::failure("Could not", "boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_from_result_converts_errors() {
        let outcome =
            HandlerOutcome::from_result(Err(anyhow::anyhow!("db unreachable")), "task");
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("db unreachable"));
        assert!(outcome.message.contains("task"));
    }

    #[test]
    fn test_outcome_serialization_skips_none() {
        let ok = HandlerOutcome::ok("Done", None);
        let value = serde_json::to_value(&ok).unwrap();
        assert!(value.get("error").is_none());
        assert!(value.get("data").is_none());
        assert_eq!(value["success"], true);
    }
}
