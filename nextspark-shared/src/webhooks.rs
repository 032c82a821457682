/// Webhook egress: routing, signing, and delivery
///
/// Entity mutations emit `<entity>:<action>` events. Each event resolves to
/// at most one endpoint URL from routes configured in the environment, and
/// is delivered as a JSON POST through the scheduled-action registry
/// (fire-and-forget, no retry).
///
/// # Routing
///
/// `WEBHOOK_ROUTES` holds comma-separated `key=url` pairs. Keys are matched
/// in precedence order for an event `entity:action`:
///
/// 1. exact `entity:action`
/// 2. entity wildcard `entity:*`
/// 3. action wildcard `*:action`
/// 4. `default`
///
/// No matching key means the event is dropped.
///
/// # Security
///
/// When `WEBHOOK_SIGNING_SECRET` is set, every delivery carries an
/// HMAC-SHA256 hex signature of the request body in the
/// `X-NextSpark-Signature` header. Recipients should verify it.
///
/// # Payload
///
/// ```json
/// {
///   "event": "task:created",
///   "entity": "task",
///   "entityId": "550e8400-e29b-41d4-a716-446655440000",
///   "data": {"title": "Ship it"},
///   "teamId": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
///   "timestamp": "2025-06-01T12:00:00Z",
///   "actionId": "9f8b7c6d-5e4f-3a2b-1c0d-e9f8a7b6c5d4"
/// }
/// ```

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::actions::ScheduledAction;
use async_trait::async_trait;

/// Signature header name
pub const SIGNATURE_HEADER: &str = "X-NextSpark-Signature";

/// Registry name of the delivery action
pub const DELIVER_ACTION: &str = "webhook.deliver";

/// Outbound webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Event name, `<entity>:<action>`
    pub event: String,

    /// Entity kind (e.g. "task")
    pub entity: String,

    /// Mutated entity ID
    pub entity_id: Uuid,

    /// Entity snapshot or change summary
    pub data: JsonValue,

    /// Team the mutation happened in
    pub team_id: Uuid,

    /// When the event was emitted
    pub timestamp: DateTime<Utc>,

    /// Unique ID for this dispatch (for receiver-side dedup)
    pub action_id: Uuid,
}

impl WebhookPayload {
    /// Builds a payload for an entity mutation
    pub fn new(entity: &str, action: &str, entity_id: Uuid, team_id: Uuid, data: JsonValue) -> Self {
        WebhookPayload {
            event: format!("{}:{}", entity, action),
            entity: entity.to_string(),
            entity_id,
            data,
            team_id,
            timestamp: Utc::now(),
            action_id: Uuid::new_v4(),
        }
    }
}

/// Endpoint routing table parsed from the environment
#[derive(Debug, Clone, Default)]
pub struct WebhookRouter {
    routes: HashMap<String, String>,
}

impl WebhookRouter {
    /// Parses a routes spec: comma-separated `key=url` pairs
    ///
    /// Keys are exact events (`task:created`), wildcards (`task:*`,
    /// `*:deleted`), or `default`. Malformed pairs are skipped.
    pub fn parse(spec: &str) -> Self {
        let mut routes = HashMap::new();

        for pair in spec.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((key, url)) if !key.trim().is_empty() && !url.trim().is_empty() => {
                    routes.insert(key.trim().to_string(), url.trim().to_string());
                }
                _ => {
                    tracing::warn!(pair, "Skipping malformed webhook route");
                }
            }
        }

        WebhookRouter { routes }
    }

    /// Reads routes from `WEBHOOK_ROUTES` (empty router if unset)
    pub fn from_env() -> Self {
        match std::env::var("WEBHOOK_ROUTES") {
            Ok(spec) => Self::parse(&spec),
            Err(_) => WebhookRouter::default(),
        }
    }

    /// Whether any routes are configured
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolves the endpoint URL for an event
    ///
    /// Precedence: exact key, then `entity:*`, then `*:action`, then
    /// `default`.
    pub fn resolve(&self, entity: &str, action: &str) -> Option<&str> {
        let exact = format!("{}:{}", entity, action);
        if let Some(url) = self.routes.get(&exact) {
            return Some(url);
        }

        let entity_wildcard = format!("{}:*", entity);
        if let Some(url) = self.routes.get(&entity_wildcard) {
            return Some(url);
        }

        let action_wildcard = format!("*:{}", action);
        if let Some(url) = self.routes.get(&action_wildcard) {
            return Some(url);
        }

        self.routes.get("default").map(String::as_str)
    }
}

/// Generates an HMAC-SHA256 hex signature for a payload body
pub fn sign_payload(secret: &[u8], body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(body);

    hex::encode(mac.finalize().into_bytes())
}

/// The webhook delivery action
///
/// Registered as `webhook.deliver` in the scheduled-action registry. Runs
/// under the registry's timeout; a non-success HTTP status is an error the
/// registry logs. Events without a matching route resolve to a no-op.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    router: WebhookRouter,
    signing_secret: Option<String>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher with its own HTTP client
    pub fn new(
        router: WebhookRouter,
        signing_secret: Option<String>,
        request_timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();

        WebhookDispatcher {
            client,
            router,
            signing_secret,
        }
    }
}

#[async_trait]
impl ScheduledAction for WebhookDispatcher {
    fn name(&self) -> &'static str {
        DELIVER_ACTION
    }

    async fn run(&self, payload: JsonValue) -> anyhow::Result<()> {
        let payload: WebhookPayload = serde_json::from_value(payload)?;

        let action = payload
            .event
            .split_once(':')
            .map(|(_, action)| action)
            .unwrap_or_default();

        let url = match self.router.resolve(&payload.entity, action) {
            Some(url) => url.to_string(),
            None => {
                debug!(event = %payload.event, "No webhook route configured, dropping event");
                return Ok(());
            }
        };

        let body = serde_json::to_vec(&payload)?;

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(ref secret) = self.signing_secret {
            let signature = sign_payload(secret.as_bytes(), &body);
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request.body(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            anyhow::bail!("Webhook endpoint {} returned {}", url, status);
        }

        debug!(event = %payload.event, url = %url, action_id = %payload.action_id, "Webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape_is_camel_case() {
        let payload = WebhookPayload::new(
            "task",
            "created",
            Uuid::new_v4(),
            Uuid::new_v4(),
            json!({"title": "Ship it"}),
        );

        assert_eq!(payload.event, "task:created");

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("entityId").is_some());
        assert!(value.get("teamId").is_some());
        assert!(value.get("actionId").is_some());
        assert!(value.get("timestamp").is_some());
        assert!(value.get("entity_id").is_none());
    }

    #[test]
    fn test_route_precedence() {
        let router = WebhookRouter::parse(
            "task:created=https://a.example/hook,\
             task:*=https://b.example/hook,\
             *:deleted=https://c.example/hook,\
             default=https://d.example/hook",
        );

        // Exact beats entity wildcard
        assert_eq!(router.resolve("task", "created"), Some("https://a.example/hook"));
        // Entity wildcard beats action wildcard
        assert_eq!(router.resolve("task", "deleted"), Some("https://b.example/hook"));
        // Action wildcard beats default
        assert_eq!(router.resolve("page", "deleted"), Some("https://c.example/hook"));
        // Default as fallback
        assert_eq!(router.resolve("page", "created"), Some("https://d.example/hook"));
    }

    #[test]
    fn test_no_route_resolves_none() {
        let router = WebhookRouter::parse("task:created=https://a.example/hook");
        assert_eq!(router.resolve("page", "published"), None);
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let router = WebhookRouter::parse("garbage,=nope,task:created=https://a.example/hook,");
        assert_eq!(router.resolve("task", "created"), Some("https://a.example/hook"));
        assert_eq!(router.routes.len(), 1);
    }

    #[test]
    fn test_empty_router() {
        let router = WebhookRouter::parse("");
        assert!(router.is_empty());
        assert_eq!(router.resolve("task", "created"), None);
    }

    #[test]
    fn test_sign_payload_deterministic() {
        let sig1 = sign_payload(b"secret", b"body");
        let sig2 = sign_payload(b"secret", b"body");
        let sig3 = sign_payload(b"secret", b"other");

        assert_eq!(sig1.len(), 64); // HMAC-SHA256 hex
        assert_eq!(sig1, sig2);
        assert_ne!(sig1, sig3);
    }
}
