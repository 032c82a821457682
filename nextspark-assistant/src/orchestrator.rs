/// Conversation orchestrator
///
/// The orchestrator is thin dispatch: extract an intent from the message,
/// route it to the entity handler, and format the outcome into a reply.
/// Unknown entities and extraction failures become failed outcomes, never
/// errors — the conversations endpoint always answers 200 with an outcome.
///
/// # Flow
///
/// ```text
/// message ──> IntentExtractor ──> Intent{action, parameters}
///                                     │
///             ┌── task.* ────────────▶ handlers::task
///             ├── customer.* ────────▶ handlers::customer
///             ├── page.* ────────────▶ handlers::page
///             └── other ─────────────▶ failed outcome
///                                     │
///                    HandlerOutcome ──▶ reply formatting
/// ```

use sqlx::PgPool;
use std::sync::Arc;

use crate::handlers::{self, ConversationContext, HandlerOutcome};
use crate::intent::Intent;
use crate::llm::IntentExtractor;

/// The formatted result of one conversation turn
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConversationReply {
    /// User-facing reply text
    pub reply: String,

    /// The extracted intent (None when extraction failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,

    /// The raw handler outcome
    pub outcome: HandlerOutcome,
}

/// Dispatches conversation messages to entity handlers
pub struct Orchestrator {
    pool: PgPool,
    extractor: Arc<dyn IntentExtractor>,
}

impl Orchestrator {
    /// Creates an orchestrator over a database pool and an extractor
    pub fn new(pool: PgPool, extractor: Arc<dyn IntentExtractor>) -> Self {
        Orchestrator { pool, extractor }
    }

    /// Runs one conversation turn
    pub async fn converse(&self, ctx: &ConversationContext, message: &str) -> ConversationReply {
        let intent = match self.extractor.extract(message).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(error = %e, "Intent extraction failed");
                let outcome = HandlerOutcome::failure(
                    "Sorry, I couldn't understand that request.",
                    e.to_string(),
                );
                return ConversationReply {
                    reply: format_reply(&outcome),
                    intent: None,
                    outcome,
                };
            }
        };

        tracing::debug!(action = %intent.action, team_id = %ctx.team_id, "Dispatching intent");

        let outcome = self.dispatch(ctx, &intent).await;

        ConversationReply {
            reply: format_reply(&outcome),
            intent: Some(intent),
            outcome,
        }
    }

    /// Routes an intent to its entity handler
    pub async fn dispatch(&self, ctx: &ConversationContext, intent: &Intent) -> HandlerOutcome {
        match intent.entity() {
            "task" => handlers::task::handle(&self.pool, ctx, intent).await,
            "customer" => handlers::customer::handle(&self.pool, ctx, intent).await,
            "page" => handlers::page::handle(&self.pool, ctx, intent).await,
            entity => HandlerOutcome::failure(
                "Sorry, I can only help with tasks, customers, and pages.",
                format!("unsupported entity: {}", entity),
            ),
        }
    }
}

/// Formats an outcome into the user-facing reply
///
/// Successful outcomes speak for themselves; failures get a gentle prefix
/// unless the handler already produced a conversational message.
fn format_reply(outcome: &HandlerOutcome) -> String {
    if outcome.success || outcome.message.starts_with("Sorry") || outcome.message.starts_with("I ") {
        outcome.message.clone()
    } else {
        format!("Sorry - {}", outcome.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_reply_success_passthrough() {
        let outcome = HandlerOutcome::ok("Created task \"x\".", None);
        assert_eq!(format_reply(&outcome), "Created task \"x\".");
    }

    #[test]
    fn test_format_reply_failure_prefix() {
        let outcome = HandlerOutcome::failure("That didn't work.", "boom");
        assert_eq!(format_reply(&outcome), "Sorry - That didn't work.");

        // Conversational failures stay untouched
        let outcome = HandlerOutcome::failure("I need a title to create a task.", "missing");
        assert_eq!(format_reply(&outcome), "I need a title to create a task.");
    }
}
