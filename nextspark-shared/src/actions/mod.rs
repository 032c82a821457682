/// Scheduled-action registry
///
/// A scheduled action is a named async callback registered at startup and
/// invoked fire-and-forget with a timeout. The registry is the only
/// background-work mechanism in NextSpark; webhook dispatch runs through it.
///
/// There is deliberately no retry or backoff: failures and timeouts are
/// logged and never propagate to the request that triggered the invocation.
///
/// # Example
///
/// ```
/// use nextspark_shared::actions::{ActionRegistry, ScheduledAction};
/// use async_trait::async_trait;
/// use serde_json::Value as JsonValue;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct LogAction;
///
/// #[async_trait]
/// impl ScheduledAction for LogAction {
///     fn name(&self) -> &'static str {
///         "log.echo"
///     }
///
///     async fn run(&self, payload: JsonValue) -> anyhow::Result<()> {
///         tracing::info!(?payload, "echo");
///         Ok(())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut registry = ActionRegistry::new(Duration::from_secs(10));
/// registry.register(Arc::new(LogAction));
///
/// registry.invoke("log.echo", serde_json::json!({"hello": "world"}));
/// # }
/// ```

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use async_trait::async_trait;

/// Contract for a named, asynchronously invokable callback
#[async_trait]
pub trait ScheduledAction: Send + Sync {
    /// Registry key (e.g. "webhook.deliver")
    fn name(&self) -> &'static str;

    /// Executes the action with an opaque JSON payload
    async fn run(&self, payload: JsonValue) -> anyhow::Result<()>;
}

/// Registry of named scheduled actions
///
/// Cheap to clone; actions are shared behind Arcs.
#[derive(Clone)]
pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn ScheduledAction>>,
    timeout: Duration,
}

impl ActionRegistry {
    /// Creates an empty registry with the given per-invocation timeout
    pub fn new(timeout: Duration) -> Self {
        ActionRegistry {
            actions: HashMap::new(),
            timeout,
        }
    }

    /// Registers an action under its own name
    ///
    /// Re-registering a name replaces the previous action.
    pub fn register(&mut self, action: Arc<dyn ScheduledAction>) {
        self.actions.insert(action.name(), action);
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Invokes an action by name, fire-and-forget
    ///
    /// Spawns the callback on the runtime under a timeout. Returns whether a
    /// registered action was found; the outcome of the callback itself is
    /// only ever logged.
    pub fn invoke(&self, name: &str, payload: JsonValue) -> bool {
        let action = match self.actions.get(name) {
            Some(action) => Arc::clone(action),
            None => {
                warn!(action = name, "Ignoring invocation of unregistered action");
                return false;
            }
        };

        let timeout = self.timeout;
        let name = action.name();

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, action.run(payload)).await {
                Ok(Ok(())) => {
                    debug!(action = name, "Scheduled action completed");
                }
                Ok(Err(e)) => {
                    warn!(action = name, error = %e, "Scheduled action failed");
                }
                Err(_) => {
                    warn!(action = name, timeout_secs = timeout.as_secs(), "Scheduled action timed out");
                }
            }
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct RecordingAction {
        tx: mpsc::UnboundedSender<JsonValue>,
    }

    #[async_trait]
    impl ScheduledAction for RecordingAction {
        fn name(&self) -> &'static str {
            "test.record"
        }

        async fn run(&self, payload: JsonValue) -> anyhow::Result<()> {
            self.tx.send(payload).ok();
            Ok(())
        }
    }

    struct SlowAction;

    #[async_trait]
    impl ScheduledAction for SlowAction {
        fn name(&self) -> &'static str {
            "test.slow"
        }

        async fn run(&self, _payload: JsonValue) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_invoke_runs_registered_action() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut registry = ActionRegistry::new(Duration::from_secs(5));
        registry.register(Arc::new(RecordingAction { tx }));

        let dispatched = registry.invoke("test.record", serde_json::json!({"n": 1}));
        assert!(dispatched);

        let payload = rx.recv().await.expect("action should run");
        assert_eq!(payload["n"], 1);
    }

    #[tokio::test]
    async fn test_invoke_unknown_action_is_noop() {
        let registry = ActionRegistry::new(Duration::from_secs(5));
        assert!(!registry.invoke("no.such.action", serde_json::json!({})));
    }

    #[tokio::test]
    async fn test_timeout_does_not_block_caller() {
        let mut registry = ActionRegistry::new(Duration::from_millis(10));
        registry.register(Arc::new(SlowAction));

        // Returns immediately even though the action would run for an hour
        let dispatched = registry.invoke("test.slow", serde_json::json!({}));
        assert!(dispatched);
    }

    #[test]
    fn test_contains() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut registry = ActionRegistry::new(Duration::from_secs(5));
        assert!(!registry.contains("test.record"));

        registry.register(Arc::new(RecordingAction { tx }));
        assert!(registry.contains("test.record"));
    }
}
