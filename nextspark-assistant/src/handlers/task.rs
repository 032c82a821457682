/// Task handler node
///
/// Supported verbs: `create`, `list`, `update`, `complete`.

use anyhow::{anyhow, Context as _};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use nextspark_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};

use crate::intent::{normalize_priority, normalize_task_status, Intent};

use super::{ConversationContext, HandlerOutcome};

/// Handles a task intent, converting any failure into a uniform outcome
pub async fn handle(pool: &PgPool, ctx: &ConversationContext, intent: &Intent) -> HandlerOutcome {
    HandlerOutcome::from_result(run(pool, ctx, intent).await, "task")
}

async fn run(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    match intent.verb() {
        "create" => create(pool, ctx, intent).await,
        "list" => list(pool, ctx, intent).await,
        "update" => update(pool, ctx, intent).await,
        "complete" => complete(pool, ctx, intent).await,
        verb => Ok(HandlerOutcome::failure(
            format!("I don't know how to {} a task.", verb),
            format!("unsupported task verb: {}", verb),
        )),
    }
}

async fn create(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let title = match intent.param_str("title") {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => {
            return Ok(HandlerOutcome::failure(
                "I need a title to create a task.",
                "missing parameter: title",
            ))
        }
    };

    let priority = intent.param_str("priority").and_then(normalize_priority);
    let description = intent
        .param_str("description")
        .map(|s| s.trim().to_string());

    let task = Task::create(
        pool,
        CreateTask {
            team_id: ctx.team_id,
            created_by: ctx.user_id,
            title: title.clone(),
            description,
            priority,
            assignee_id: None,
            due_date: None,
        },
    )
    .await
    .context("creating task")?;

    Ok(HandlerOutcome::ok(
        format!("Created task \"{}\" with {} priority.", title, task.priority),
        Some(json!({"task": task})),
    ))
}

async fn list(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let limit = intent
        .parameters
        .get("limit")
        .and_then(|v| v.as_i64())
        .unwrap_or(20)
        .clamp(1, 100);

    let status = intent.param_str("status").and_then(normalize_task_status);

    let tasks = match status {
        Some(status) => Task::list_by_status(pool, ctx.team_id, status, limit, 0)
            .await
            .context("listing tasks by status")?,
        None => Task::list_by_team(pool, ctx.team_id, limit, 0)
            .await
            .context("listing tasks")?,
    };

    let message = match (tasks.len(), status) {
        (0, Some(s)) => format!("No {} tasks found.", s.as_str()),
        (0, None) => "No tasks found.".to_string(),
        (n, Some(s)) => format!("Found {} {} task(s).", n, s.as_str()),
        (n, None) => format!("Found {} task(s).", n),
    };

    Ok(HandlerOutcome::ok(message, Some(json!({"tasks": tasks}))))
}

async fn update(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let task_id = require_task_id(intent)?;

    let update = UpdateTask {
        title: intent.param_str("title").map(str::to_string),
        description: intent.param_str("description").map(str::to_string),
        status: intent.param_str("status").and_then(normalize_task_status),
        priority: intent.param_str("priority").and_then(normalize_priority),
        assignee_id: None,
        due_date: None,
    };

    match Task::update(pool, task_id, ctx.team_id, update)
        .await
        .context("updating task")?
    {
        Some(task) => Ok(HandlerOutcome::ok(
            format!("Updated task \"{}\".", task.title),
            Some(json!({"task": task})),
        )),
        None => Ok(HandlerOutcome::failure(
            "I couldn't find that task.",
            format!("task {} not found in team", task_id),
        )),
    }
}

async fn complete(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let task_id = require_task_id(intent)?;

    let update = UpdateTask {
        status: Some(TaskStatus::Done),
        ..Default::default()
    };

    match Task::update(pool, task_id, ctx.team_id, update)
        .await
        .context("completing task")?
    {
        Some(task) => Ok(HandlerOutcome::ok(
            format!("Marked \"{}\" as done.", task.title),
            Some(json!({"task": task})),
        )),
        None => Ok(HandlerOutcome::failure(
            "I couldn't find that task.",
            format!("task {} not found in team", task_id),
        )),
    }
}

fn require_task_id(intent: &Intent) -> anyhow::Result<Uuid> {
    let raw = intent
        .param_str("task_id")
        .or_else(|| intent.param_str("id"))
        .ok_or_else(|| anyhow!("missing parameter: task_id"))?;

    Uuid::parse_str(raw).map_err(|_| anyhow!("task_id is not a valid UUID: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_task_id_accepts_both_keys() {
        let id = Uuid::new_v4();

        let intent = Intent::new("task.update", json!({"task_id": id.to_string()}));
        assert_eq!(require_task_id(&intent).unwrap(), id);

        let intent = Intent::new("task.update", json!({"id": id.to_string()}));
        assert_eq!(require_task_id(&intent).unwrap(), id);
    }

    #[test]
    fn test_require_task_id_rejects_garbage() {
        let intent = Intent::new("task.update", json!({"task_id": "nope"}));
        assert!(require_task_id(&intent).is_err());

        let intent = Intent::new("task.update", json!({}));
        assert!(require_task_id(&intent).is_err());
    }
}
