/// Structured intents and enum-field normalization
///
/// An intent is what the upstream LLM extracts from a user message:
///
/// ```json
/// {"action": "task.create", "parameters": {"title": "Ship it", "priority": "URGENT"}}
/// ```
///
/// Actions are dotted `<entity>.<verb>` strings. Parameters arrive as loose
/// JSON; enum-like string fields (priority, status) are normalized here with
/// fuzzy, case-insensitive matching before they reach the CRUD layer.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use nextspark_shared::models::customer::CustomerStatus;
use nextspark_shared::models::task::{TaskPriority, TaskStatus};

/// A structured intent extracted from a conversation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Dotted action string, e.g. "task.create"
    pub action: String,

    /// Loose parameter object
    #[serde(default)]
    pub parameters: JsonValue,
}

impl Intent {
    /// Creates an intent
    pub fn new(action: impl Into<String>, parameters: JsonValue) -> Self {
        Intent {
            action: action.into(),
            parameters,
        }
    }

    /// The entity segment of the action ("task.create" → "task")
    pub fn entity(&self) -> &str {
        self.action.split('.').next().unwrap_or("")
    }

    /// The verb segment of the action ("task.create" → "create")
    pub fn verb(&self) -> &str {
        self.action.split('.').nth(1).unwrap_or("")
    }

    /// Gets a string parameter
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }
}

/// Normalizes a free-form priority string
///
/// Accepts canonical values plus common synonyms; matching is
/// case-insensitive and ignores surrounding whitespace and punctuation.
pub fn normalize_priority(raw: &str) -> Option<TaskPriority> {
    let cleaned = clean(raw);

    match cleaned.as_str() {
        "low" | "minor" | "p3" | "trivial" => Some(TaskPriority::Low),
        "medium" | "normal" | "default" | "p2" => Some(TaskPriority::Medium),
        "high" | "important" | "p1" => Some(TaskPriority::High),
        "urgent" | "critical" | "asap" | "p0" | "blocker" => Some(TaskPriority::Urgent),
        _ => None,
    }
}

/// Normalizes a free-form task status string
pub fn normalize_task_status(raw: &str) -> Option<TaskStatus> {
    let cleaned = clean(raw);

    match cleaned.as_str() {
        "todo" | "to do" | "open" | "backlog" | "pending" => Some(TaskStatus::Todo),
        "in progress" | "in_progress" | "doing" | "started" | "wip" | "active" => {
            Some(TaskStatus::InProgress)
        }
        "done" | "complete" | "completed" | "finished" | "closed" => Some(TaskStatus::Done),
        "archived" | "archive" => Some(TaskStatus::Archived),
        _ => None,
    }
}

/// Normalizes a free-form customer status string
pub fn normalize_customer_status(raw: &str) -> Option<CustomerStatus> {
    let cleaned = clean(raw);

    match cleaned.as_str() {
        "lead" | "prospect" | "new" => Some(CustomerStatus::Lead),
        "active" | "customer" | "paying" | "current" => Some(CustomerStatus::Active),
        "churned" | "lost" | "canceled" | "cancelled" | "former" => Some(CustomerStatus::Churned),
        _ => None,
    }
}

/// Lowercases and strips punctuation noise ("URGENT!" → "urgent")
fn clean(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() && c != '_')
        .to_lowercase()
        .replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_segments() {
        let intent = Intent::new("task.create", json!({"title": "x"}));
        assert_eq!(intent.entity(), "task");
        assert_eq!(intent.verb(), "create");
        assert_eq!(intent.param_str("title"), Some("x"));
        assert_eq!(intent.param_str("missing"), None);
    }

    #[test]
    fn test_intent_deserializes_without_parameters() {
        let intent: Intent = serde_json::from_value(json!({"action": "task.list"})).unwrap();
        assert!(intent.parameters.is_null());
    }

    #[test]
    fn test_normalize_priority_synonyms() {
        assert_eq!(normalize_priority("URGENT!"), Some(TaskPriority::Urgent));
        assert_eq!(normalize_priority("critical"), Some(TaskPriority::Urgent));
        assert_eq!(normalize_priority("p0"), Some(TaskPriority::Urgent));
        assert_eq!(normalize_priority(" High "), Some(TaskPriority::High));
        assert_eq!(normalize_priority("normal"), Some(TaskPriority::Medium));
        assert_eq!(normalize_priority("minor"), Some(TaskPriority::Low));
        assert_eq!(normalize_priority("whenever"), None);
    }

    #[test]
    fn test_normalize_task_status_synonyms() {
        assert_eq!(normalize_task_status("To Do"), Some(TaskStatus::Todo));
        assert_eq!(normalize_task_status("in progress"), Some(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("WIP"), Some(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("Completed"), Some(TaskStatus::Done));
        assert_eq!(normalize_task_status("archived"), Some(TaskStatus::Archived));
        assert_eq!(normalize_task_status("someday"), None);
    }

    #[test]
    fn test_normalize_customer_status_synonyms() {
        assert_eq!(normalize_customer_status("Prospect"), Some(CustomerStatus::Lead));
        assert_eq!(normalize_customer_status("paying"), Some(CustomerStatus::Active));
        assert_eq!(normalize_customer_status("cancelled"), Some(CustomerStatus::Churned));
        assert_eq!(normalize_customer_status("mystery"), None);
    }
}
