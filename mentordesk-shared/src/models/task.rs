/// Task model and database operations
///
/// Tasks are the unit of work mentors and admins manage on the platform.
/// Each task carries a single lifecycle status; the tagged enum makes the
/// illegal flag combinations of a two-boolean encoding unrepresentable.
///
/// # State Machine
///
/// ```text
/// open ──(update status)──▶ completed
/// completed ──(reopen)────▶ open
/// open | completed ──(soft close)──▶ closed
/// any ──(hard delete)─────▶ record removed
/// ```
///
/// Closed tasks remain queryable but are excluded from active listings.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('open', 'completed', 'closed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'open',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Actionable, not yet done
    Open,

    /// Marked done; the record stays in active listings until closed
    Completed,

    /// Soft-deleted; retained for audit, hidden from active listings
    Closed,
}

impl TaskStatus {
    /// Converts status to string for database storage and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
            TaskStatus::Closed => "closed",
        }
    }

    /// Whether the task shows up in active listings
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Open | TaskStatus::Completed)
    }

    /// Checks whether a direct status change is legal
    ///
    /// Re-setting the current status is treated as legal (no-op write).
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Open, TaskStatus::Completed) => true,
            (TaskStatus::Completed, TaskStatus::Open) => true,

            // Any live task can be soft-closed; closing twice is harmless
            (_, TaskStatus::Closed) => true,

            // No-op writes are legal
            (a, b) if *a == b => true,

            // Closed tasks never come back through a plain status edit
            _ => false,
        }
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// User who created the task (nullable if the user was deleted)
    pub created_by: Option<Uuid>,

    /// Short human-readable title
    pub title: String,

    /// Free-text description, opaque to the lifecycle
    pub description: String,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Creating user
    pub created_by: Option<Uuid>,

    /// Task title
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: String,
}

/// Partial update applied to an existing task
///
/// `None` fields are left untouched. `status` moves the task through the
/// lifecycle and is validated by the engine before it reaches the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New lifecycle status
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// True when the patch carries nothing to write
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

const TASK_COLUMNS: &str = "id, created_by, title, description, status, created_at, updated_at";

impl Task {
    /// Creates a new task in the open state
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (created_by, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, created_by, title, description, status, created_at, updated_at
            "#,
        )
        .bind(data.created_by)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, closed records included
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, created_by, title, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a field patch to a task
    ///
    /// Builds the SET clause dynamically from the non-None patch fields.
    /// When `expect` is given the write only applies while the row still
    /// holds that status, making a combined field-and-status edit a single
    /// atomic compare-and-set. Returns `None` if the task does not exist or
    /// the expectation no longer holds.
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        patch: TaskPatch,
        expect: Option<TaskStatus>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");
        if expect.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        query.push_str(&format!(" RETURNING {}", TASK_COLUMNS));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(expected) = expect {
            q = q.bind(expected);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Atomically moves a task to `target`
    ///
    /// When `expect` is given the write is a compare-and-set: it only applies
    /// while the row still holds the expected status, which is what serializes
    /// two racing transitions against the same task. Returns `None` when the
    /// row is missing or the expectation no longer holds.
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        expect: Option<TaskStatus>,
        target: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = match expect {
            Some(expected) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    UPDATE tasks
                    SET status = $3, updated_at = NOW()
                    WHERE id = $1 AND status = $2
                    RETURNING id, created_by, title, description, status, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(expected)
                .bind(target)
                .fetch_optional(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    UPDATE tasks
                    SET status = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, created_by, title, description, status, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(target)
                .fetch_optional(pool)
                .await?
            }
        };

        Ok(task)
    }

    /// Lists tasks, newest first
    ///
    /// Closed tasks are excluded unless `include_closed` is set.
    pub async fn list(pool: &PgPool, include_closed: bool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = if include_closed {
            sqlx::query_as::<_, Task>(
                r#"
                SELECT id, created_by, title, description, status, created_at, updated_at
                FROM tasks
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as::<_, Task>(
                r#"
                SELECT id, created_by, title, description, status, created_at, updated_at
                FROM tasks
                WHERE status <> 'closed'
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        };

        Ok(tasks)
    }

    /// Permanently removes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Open.as_str(), "open");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(TaskStatus::Closed.as_str(), "closed");
    }

    #[test]
    fn test_task_status_is_active() {
        assert!(TaskStatus::Open.is_active());
        assert!(TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Closed.is_active());
    }

    #[test]
    fn test_task_status_transitions() {
        assert!(TaskStatus::Open.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::Open));

        // Soft close reaches closed from anywhere
        assert!(TaskStatus::Open.can_transition_to(TaskStatus::Closed));
        assert!(TaskStatus::Completed.can_transition_to(TaskStatus::Closed));
        assert!(TaskStatus::Closed.can_transition_to(TaskStatus::Closed));

        // Closed never returns through a plain status edit
        assert!(!TaskStatus::Closed.can_transition_to(TaskStatus::Open));
        assert!(!TaskStatus::Closed.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_task_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch {
            title: Some("t".to_string()),
            ..Default::default()
        }
        .is_empty());
        assert!(!TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn test_task_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Completed).unwrap(),
            "\"completed\""
        );
        let parsed: TaskStatus = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(parsed, TaskStatus::Open);
    }
}
