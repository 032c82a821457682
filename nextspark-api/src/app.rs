/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use nextspark_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = nextspark_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use nextspark_assistant::{HttpIntentExtractor, Orchestrator};
use nextspark_shared::actions::ActionRegistry;
use nextspark_shared::auth::{jwt, middleware::AuthContext};
use nextspark_shared::webhooks::{WebhookDispatcher, WebhookPayload, WebhookRouter, DELIVER_ACTION};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Scheduled-action registry (webhook dispatch)
    pub actions: ActionRegistry,

    /// Conversation orchestrator (None when no LLM endpoint configured)
    pub assistant: Option<Arc<Orchestrator>>,
}

impl AppState {
    /// Creates application state from configuration
    ///
    /// Wires the webhook dispatcher into the action registry and builds the
    /// assistant orchestrator when an LLM endpoint is configured.
    pub fn new(db: PgPool, config: Config) -> Self {
        let webhook_timeout = Duration::from_secs(config.webhooks.timeout_seconds);

        let router = WebhookRouter::parse(&config.webhooks.routes);
        let mut actions = ActionRegistry::new(webhook_timeout);
        actions.register(Arc::new(WebhookDispatcher::new(
            router,
            config.webhooks.signing_secret.clone(),
            webhook_timeout,
        )));

        let assistant = config.llm.endpoint.as_ref().map(|endpoint| {
            let extractor = Arc::new(HttpIntentExtractor::new(
                endpoint.clone(),
                config.llm.api_key.clone(),
                Duration::from_secs(config.llm.timeout_seconds),
            ));
            Arc::new(Orchestrator::new(db.clone(), extractor))
        });

        Self {
            db,
            config: Arc::new(config),
            actions,
            assistant,
        }
    }

    /// Replaces the assistant orchestrator (tests inject a mock extractor)
    pub fn with_assistant(mut self, assistant: Arc<Orchestrator>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Emits an entity mutation event through the scheduled-action registry
    ///
    /// Fire-and-forget; delivery failures are logged by the registry and
    /// never reach the request that triggered the mutation.
    pub fn dispatch_webhook(
        &self,
        entity: &str,
        action: &str,
        entity_id: Uuid,
        team_id: Uuid,
        data: JsonValue,
    ) {
        let payload = WebhookPayload::new(entity, action, entity_id, team_id, data);

        match serde_json::to_value(&payload) {
            Ok(value) => {
                self.actions.invoke(DELIVER_ACTION, value);
            }
            Err(e) => {
                tracing::warn!(event = %payload.event, error = %e, "Failed to serialize webhook payload");
            }
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/v1/
///     ├── /auth/                     # register, login, refresh (public)
///     ├── /users/me                  # profile (JWT)
///     ├── /teams/...                 # team + member management (JWT)
///     └── team-scoped (JWT + X-Team-Id, or API key):
///         /tasks /customers /pages /patterns
///         /api-keys /billing /conversations
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first): security headers, CORS, trace
/// logging; authentication and team context per route group.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Profile routes (JWT only)
    let user_routes = Router::new()
        .route(
            "/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Team management routes (JWT only; team named in the path)
    let team_routes = Router::new()
        .route(
            "/",
            post(routes::teams::create_team).get(routes::teams::list_teams),
        )
        .route(
            "/:id",
            get(routes::teams::get_team)
                .patch(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route(
            "/:id/members",
            get(routes::teams::list_members).post(routes::teams::add_member),
        )
        .route(
            "/:id/members/:user_id",
            axum::routing::patch(routes::teams::update_member_role)
                .delete(routes::teams::remove_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Team-scoped entity routes (JWT + X-Team-Id header, or API key)
    let team_scoped = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/customers",
            get(routes::customers::list_customers).post(routes::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(routes::customers::get_customer)
                .patch(routes::customers::update_customer)
                .delete(routes::customers::delete_customer),
        )
        .route(
            "/pages",
            get(routes::pages::list_pages).post(routes::pages::create_page),
        )
        .route(
            "/pages/:id",
            get(routes::pages::get_page)
                .patch(routes::pages::update_page)
                .delete(routes::pages::delete_page),
        )
        .route("/pages/:id/publish", post(routes::pages::publish_page))
        .route(
            "/patterns",
            get(routes::patterns::list_patterns).post(routes::patterns::create_pattern),
        )
        .route(
            "/patterns/:id",
            get(routes::patterns::get_pattern)
                .patch(routes::patterns::update_pattern)
                .delete(routes::patterns::delete_pattern),
        )
        .route(
            "/patterns/:id/usages",
            get(routes::patterns::list_pattern_usages),
        )
        .route(
            "/api-keys",
            get(routes::api_keys::list_api_keys).post(routes::api_keys::create_api_key),
        )
        .route(
            "/api-keys/:id/revoke",
            post(routes::api_keys::revoke_api_key),
        )
        .route(
            "/billing/subscription",
            get(routes::billing::get_subscription),
        )
        .route("/billing/plan", put(routes::billing::change_plan))
        .route("/billing/usage", get(routes::billing::get_usage))
        .route(
            "/conversations",
            post(routes::conversations::create_conversation),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::team_context::team_context_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/teams", team_routes)
        .merge(team_scoped);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT-only authentication middleware layer
///
/// Extracts and validates the Bearer token, then injects AuthContext into
/// request extensions.
async fn jwt_auth_layer(
    state: State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_jwt(claims.sub));

    Ok(next.run(req).await)
}

/// Dual authentication middleware layer (JWT or API key)
///
/// Prefers `Authorization: Bearer <jwt>`; falls back to `X-Api-Key`.
async fn auth_layer(
    state: State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = if let Some(auth_header) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

        let claims = jwt::validate_access_token(token, state.jwt_secret())?;
        AuthContext::from_jwt(claims.sub)
    } else if let Some(api_key) = req
        .headers()
        .get("X-Api-Key")
        .and_then(|v| v.to_str().ok())
    {
        let key = nextspark_shared::auth::middleware::authenticate_api_key(&state.db, api_key)
            .await
            .map_err(ApiError::from)?;
        AuthContext::from_api_key(&key)
    } else {
        return Err(ApiError::Unauthorized("Missing credentials".to_string()));
    };

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
