/// Intent extraction seam
///
/// The orchestrator talks to the LLM only through the `IntentExtractor`
/// trait, mirroring the adapter seam of the worker systems this codebase
/// descends from: an HTTP implementation for production and a deterministic
/// mock for tests and demos.
///
/// # Wire Contract
///
/// `HttpIntentExtractor` POSTs to the configured endpoint:
///
/// ```json
/// {"input": "create an urgent task called Ship it"}
/// ```
///
/// and expects the extraction result back:
///
/// ```json
/// {"action": "task.create", "parameters": {"title": "Ship it", "priority": "urgent"}}
/// ```

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::intent::Intent;

/// Error type for intent extraction
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport-level failure
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with something that is not an intent
    #[error("LLM returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Turns a free-text message into a structured intent
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extracts an intent from a user message
    async fn extract(&self, message: &str) -> Result<Intent, LlmError>;
}

/// Production extractor calling an LLM endpoint over HTTP
pub struct HttpIntentExtractor {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpIntentExtractor {
    /// Creates an extractor for the given endpoint
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        HttpIntentExtractor {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl IntentExtractor for HttpIntentExtractor {
    async fn extract(&self, message: &str) -> Result<Intent, LlmError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "input": message,
        }));

        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(LlmError::InvalidResponse(format!(
                "endpoint returned {}",
                status
            )));
        }

        let intent: Intent = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if intent.action.is_empty() {
            return Err(LlmError::InvalidResponse("empty action".to_string()));
        }

        Ok(intent)
    }
}

/// Deterministic extractor for tests and demos
///
/// Returns a fixed intent for every message, or a configured error.
pub struct MockIntentExtractor {
    result: Result<Intent, String>,
}

impl MockIntentExtractor {
    /// Mock that always extracts the given intent
    pub fn returning(intent: Intent) -> Self {
        MockIntentExtractor {
            result: Ok(intent),
        }
    }

    /// Mock that always fails extraction
    pub fn failing(message: impl Into<String>) -> Self {
        MockIntentExtractor {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl IntentExtractor for MockIntentExtractor {
    async fn extract(&self, _message: &str) -> Result<Intent, LlmError> {
        match &self.result {
            Ok(intent) => Ok(intent.clone()),
            Err(message) => Err(LlmError::InvalidResponse(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_returning() {
        let mock = MockIntentExtractor::returning(Intent::new("task.list", json!({})));
        let intent = mock.extract("show my tasks").await.unwrap();
        assert_eq!(intent.action, "task.list");
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockIntentExtractor::failing("no model loaded");
        let err = mock.extract("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
