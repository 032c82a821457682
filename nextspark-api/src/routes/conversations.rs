/// Conversational assistant endpoint (team-scoped)
///
/// # Endpoint
///
/// - `POST /api/v1/conversations` - Run one conversation turn
///
/// The `ai` feature gate is enforced before the orchestrator runs. The
/// endpoint itself always answers 200 once the gate passes: extraction
/// failures, unknown intents, and handler errors all come back as failed
/// outcomes in the envelope, never as HTTP errors.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::ApiResponse,
};
use axum::{extract::State, Extension, Json};
use nextspark_assistant::{ConversationContext, ConversationReply, HandlerOutcome};
use nextspark_shared::{
    auth::{authorization::require_scope, middleware::AuthContext},
    billing::entitlement::Entitlements,
};
use serde::Deserialize;
use validator::Validate;

/// Conversation request
#[derive(Debug, Deserialize, Validate)]
pub struct ConversationRequest {
    /// Free-text user message
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

/// Run one conversation turn
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<ConversationRequest>,
) -> ApiResult<Json<ApiResponse<ConversationReply>>> {
    request.validate()?;
    require_scope(&auth, "ai:converse")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "ai.converse")
        .await?;

    let assistant = match state.assistant {
        Some(ref assistant) => assistant,
        None => {
            // No LLM endpoint configured: a failed outcome, not an error
            let outcome = HandlerOutcome::failure(
                "The assistant is not configured on this deployment.",
                "no LLM endpoint configured",
            );
            return Ok(Json(ApiResponse::new(ConversationReply {
                reply: outcome.message.clone(),
                intent: None,
                outcome,
            })));
        }
    };

    let ctx = ConversationContext {
        team_id: team.team_id,
        user_id: team.user_id,
    };

    let reply = assistant.converse(&ctx, &request.message).await;

    Ok(Json(ApiResponse::new(reply)))
}
