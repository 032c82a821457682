/// Task CRUD endpoints (team-scoped)
///
/// # Endpoints
///
/// - `GET /api/v1/tasks` - List tasks (filterable by status)
/// - `POST /api/v1/tasks` - Create task
/// - `GET /api/v1/tasks/:id` - Get task
/// - `PATCH /api/v1/tasks/:id` - Update task
/// - `DELETE /api/v1/tasks/:id` - Delete task
///
/// Every handler runs behind the team-context middleware; API keys
/// additionally need `tasks:read`/`tasks:write` scopes. Mutations dispatch
/// `task:*` webhooks after the write succeeds.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::{ApiResponse, Meta},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use nextspark_shared::{
    auth::{authorization::require_scope, middleware::AuthContext},
    billing::entitlement::Entitlements,
    models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Longer description
    #[validate(length(max = 10_000, message = "Description too long"))]
    pub description: Option<String>,

    /// Priority ("low", "medium", "high", "urgent")
    pub priority: Option<String>,

    /// Assigned team member
    pub assignee_id: Option<Uuid>,

    /// Due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 10_000, message = "Description too long"))]
    pub description: Option<String>,

    /// New status ("todo", "in_progress", "done", "archived")
    pub status: Option<String>,

    /// New priority
    pub priority: Option<String>,

    /// New assignee
    pub assignee_id: Option<Uuid>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Task list filters
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Filter by status
    pub status: Option<String>,

    /// Page size (default 20, max 100)
    pub limit: Option<i64>,

    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

impl TaskListQuery {
    fn pagination(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    TaskStatus::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown task status: {}", raw)))
}

fn parse_priority(raw: &str) -> ApiResult<TaskPriority> {
    TaskPriority::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown task priority: {}", raw)))
}

/// List tasks in the team
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    require_scope(&auth, "tasks:read")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "tasks.list")
        .await?;

    let page = query.pagination();
    let limit = page.limit();
    let offset = page.offset();

    let tasks = match query.status.as_deref() {
        Some(raw) => {
            let status = parse_status(raw)?;
            Task::list_by_status(&state.db, team.team_id, status, limit, offset).await?
        }
        None => Task::list_by_team(&state.db, team.team_id, limit, offset).await?,
    };

    let total = Task::count_by_team(&state.db, team.team_id).await?;

    Ok(Json(ApiResponse::with_meta(
        tasks,
        Meta {
            total,
            limit,
            offset,
        },
    )))
}

/// Create a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    request.validate()?;
    require_scope(&auth, "tasks:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "tasks.create")
        .await?;

    let priority = request.priority.as_deref().map(parse_priority).transpose()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            team_id: team.team_id,
            created_by: team.user_id,
            title: request.title,
            description: request.description,
            priority,
            assignee_id: request.assignee_id,
            due_date: request.due_date,
        },
    )
    .await?;

    state.dispatch_webhook("task", "created", task.id, team.team_id, json!(task));

    Ok(Json(ApiResponse::new(task)))
}

/// Get a task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    require_scope(&auth, "tasks:read")?;

    let task = Task::find_by_id_and_team(&state.db, task_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(ApiResponse::new(task)))
}

/// Update a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    request.validate()?;
    require_scope(&auth, "tasks:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "tasks.update")
        .await?;

    let status = request.status.as_deref().map(parse_status).transpose()?;
    let priority = request.priority.as_deref().map(parse_priority).transpose()?;

    let task = Task::update(
        &state.db,
        task_id,
        team.team_id,
        UpdateTask {
            title: request.title,
            description: request.description,
            status,
            priority,
            assignee_id: request.assignee_id,
            due_date: request.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    state.dispatch_webhook("task", "updated", task.id, team.team_id, json!(task));

    Ok(Json(ApiResponse::new(task)))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    require_scope(&auth, "tasks:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "tasks.delete")
        .await?;

    let deleted = Task::delete(&state.db, task_id, team.team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    state.dispatch_webhook("task", "deleted", task_id, team.team_id, json!({"id": task_id}));

    Ok(Json(ApiResponse::new(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_and_priority() {
        assert!(parse_status("in_progress").is_ok());
        assert!(parse_status("paused").is_err());
        assert!(parse_priority("urgent").is_ok());
        assert!(parse_priority("p1").is_err());
    }

    #[test]
    fn test_create_task_request_validation() {
        let valid = CreateTaskRequest {
            title: "Ship it".to_string(),
            description: None,
            priority: Some("high".to_string()),
            assignee_id: None,
            due_date: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateTaskRequest {
            title: "".to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            due_date: None,
        };
        assert!(empty_title.validate().is_err());
    }
}
