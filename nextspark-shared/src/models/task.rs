/// Task model and database operations
///
/// This module provides the Task entity, the canonical example of NextSpark's
/// CRUD scaffolding. Tasks are team-scoped and every accessor filters by
/// `team_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(50) NOT NULL DEFAULT 'todo',
///     priority VARCHAR(50) NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use nextspark_shared::models::task::{Task, CreateTask, TaskPriority};
/// use nextspark_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     team_id: Uuid::new_v4(),
///     created_by: Some(Uuid::new_v4()),
///     title: "Ship the launch page".to_string(),
///     description: None,
///     priority: Some(TaskPriority::High),
///     assignee_id: None,
///     due_date: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Completed
    Done,

    /// Hidden from default listings, kept for history
    Archived,
}

impl TaskStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        }
    }

    /// Parses status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            "archived" => Some(TaskStatus::Archived),
            _ => None,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Converts priority to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    /// Parses priority from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

/// Task model representing a unit of work within a team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Team this task belongs to
    pub team_id: Uuid,

    /// User who created the task (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// Assigned team member (nullable)
    pub assignee_id: Option<Uuid>,

    /// Task title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Workflow status ("todo", "in_progress", "done", "archived")
    pub status: String,

    /// Priority ("low", "medium", "high", "urgent")
    pub priority: String,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<TaskStatus> {
        TaskStatus::parse(&self.status)
    }

    /// Gets the parsed priority enum
    pub fn get_priority(&self) -> Option<TaskPriority> {
        TaskPriority::parse(&self.priority)
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Team ID
    pub team_id: Uuid,

    /// User who created the task
    pub created_by: Option<Uuid>,

    /// Task title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Priority (defaults to Medium)
    pub priority: Option<TaskPriority>,

    /// Assigned team member
    pub assignee_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New assignee
    pub assignee_id: Option<Uuid>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in todo state
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let priority = data.priority.unwrap_or(TaskPriority::Medium);

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (team_id, created_by, assignee_id, title, description, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, team_id, created_by, assignee_id, title, description,
                      status, priority, due_date, created_at, updated_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.created_by)
        .bind(data.assignee_id)
        .bind(data.title)
        .bind(data.description)
        .bind(priority.as_str())
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with team isolation
    ///
    /// This is the only lookup API handlers should use.
    pub async fn find_by_id_and_team(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, created_by, assignee_id, title, description,
                   status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a task with team isolation
    ///
    /// Only non-None fields in `data` will be updated.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND team_id = $2 RETURNING id, team_id, created_by, assignee_id, \
             title, description, status, priority, due_date, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(team_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority.as_str());
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task with team isolation
    pub async fn delete(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND team_id = $2")
            .bind(id)
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks for a team with pagination
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, created_by, assignee_id, title, description,
                   status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE team_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(team_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks by status for a team
    pub async fn list_by_status(
        pool: &PgPool,
        team_id: Uuid,
        status: TaskStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, created_by, assignee_id, title, description,
                   status, priority, due_date, created_at, updated_at
            FROM tasks
            WHERE team_id = $1 AND status = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(team_id)
        .bind(status.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts tasks for a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_round_trip() {
        for status in [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Archived,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("paused"), None);
    }

    #[test]
    fn test_task_priority_round_trip() {
        for priority in [
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ] {
            assert_eq!(TaskPriority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(TaskPriority::parse("p1"), None);
    }

    #[test]
    fn test_update_task_default() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.status.is_none());
        assert!(update.priority.is_none());
    }
}
