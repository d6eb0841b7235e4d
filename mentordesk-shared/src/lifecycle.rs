/// Task lifecycle engine
///
/// The engine is the single path through which task records change. Every
/// operation takes the caller's raw bearer token and walks the same gate
/// sequence:
///
/// 1. **Authorize**: verify the token and resolve a live identity. An
///    invalid token is reported as `Unauthorized` even when the target task
///    does not exist, so unauthenticated callers cannot probe for IDs.
/// 2. **Existence**: re-read the task through the store (never a cache).
///    Missing records yield `NotFound` before any state check runs.
/// 3. **State precondition**: e.g. reopen demands `Completed`.
/// 4. **Persist**: a single atomic store write; status changes go through
///    compare-and-set so concurrent transitions against the same task
///    serialize at the store.
///
/// Token verification and store calls are bounded by the configured
/// operation timeout; an elapsed timeout surfaces as `Transient` and never
/// leaves a task half-updated, because nothing was written before the single
/// store call and the store call itself is atomic.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::token::{AuthError, TokenService};
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::models::user::User;
use crate::store::{StoreError, TaskStore};

/// Default bound on a single token-verification or store call
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome kinds surfaced to the gateway
///
/// One variant per error kind in the taxonomy; the gateway maps these to
/// transport status codes.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Missing, malformed, expired, or orphaned token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced task does not exist
    #[error("Task not found")]
    NotFound,

    /// Requested transition is illegal from the task's current status
    #[error("Invalid transition from {}", .from.as_str())]
    InvalidTransition {
        /// Status the task held when the transition was rejected
        from: TaskStatus,
    },

    /// Input rejected before any store access
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Store or timeout failure; safe to retry, nothing was applied
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        LifecycleError::Transient(err.to_string())
    }
}

/// Caller-supplied fields for a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title, must be non-empty
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// Enforces transitions and authorization in front of the task store
#[derive(Clone)]
pub struct LifecycleEngine {
    tasks: Arc<dyn TaskStore>,
    tokens: TokenService,
    op_timeout: Duration,
}

impl LifecycleEngine {
    /// Creates an engine with the default operation timeout
    pub fn new(tasks: Arc<dyn TaskStore>, tokens: TokenService) -> Self {
        Self::with_timeout(tasks, tokens, DEFAULT_OP_TIMEOUT)
    }

    /// Creates an engine with an explicit per-call timeout
    pub fn with_timeout(
        tasks: Arc<dyn TaskStore>,
        tokens: TokenService,
        op_timeout: Duration,
    ) -> Self {
        Self {
            tasks,
            tokens,
            op_timeout,
        }
    }

    /// Creates a new task in the open state
    pub async fn create(&self, bearer: &str, draft: TaskDraft) -> Result<Task, LifecycleError> {
        let actor = self.authorize(bearer).await?;

        if draft.title.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "Task title must not be empty".to_string(),
            ));
        }

        let task = self
            .bounded(self.tasks.insert(NewTask {
                created_by: Some(actor.id),
                title: draft.title,
                description: draft.description,
            }))
            .await?;

        tracing::info!(task_id = %task.id, user_id = %actor.id, "Task created");
        Ok(task)
    }

    /// Applies a field patch; status edits are validated and compare-and-set
    pub async fn update(
        &self,
        bearer: &str,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, LifecycleError> {
        let actor = self.authorize(bearer).await?;

        if patch.is_empty() {
            return Err(LifecycleError::Validation(
                "Patch carries no fields".to_string(),
            ));
        }

        let current = self
            .bounded(self.tasks.get(id))
            .await?
            .ok_or(LifecycleError::NotFound)?;

        // A status-carrying patch must be a legal transition, and the write
        // is guarded on the status we just observed.
        let expect = match patch.status {
            Some(target) => {
                if !current.status.can_transition_to(target) {
                    return Err(LifecycleError::InvalidTransition {
                        from: current.status,
                    });
                }
                Some(current.status)
            }
            None => None,
        };

        let updated = self
            .bounded(self.tasks.update_fields(id, patch, expect))
            .await?;

        match updated {
            Some(task) => {
                tracing::info!(task_id = %task.id, user_id = %actor.id, status = task.status.as_str(), "Task updated");
                Ok(task)
            }
            // The guard failed between read and write: either the task went
            // away or another transition won the race.
            None => match self.bounded(self.tasks.get(id)).await? {
                Some(task) => Err(LifecycleError::InvalidTransition { from: task.status }),
                None => Err(LifecycleError::NotFound),
            },
        }
    }

    /// Soft-closes a task: status becomes closed, the record is retained
    pub async fn soft_close(&self, bearer: &str, id: Uuid) -> Result<Task, LifecycleError> {
        let actor = self.authorize(bearer).await?;

        self.bounded(self.tasks.get(id))
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let closed = self
            .bounded(self.tasks.set_status(id, None, TaskStatus::Closed))
            .await?
            .ok_or(LifecycleError::NotFound)?;

        tracing::info!(task_id = %closed.id, user_id = %actor.id, "Task soft-closed");
        Ok(closed)
    }

    /// Permanently removes a task record
    pub async fn hard_delete(&self, bearer: &str, id: Uuid) -> Result<(), LifecycleError> {
        let actor = self.authorize(bearer).await?;

        let removed = self.bounded(self.tasks.delete(id)).await?;
        if !removed {
            return Err(LifecycleError::NotFound);
        }

        tracing::info!(task_id = %id, user_id = %actor.id, "Task hard-deleted");
        Ok(())
    }

    /// Reopens a completed task
    ///
    /// Rejected with `InvalidTransition` when the task is not completed;
    /// reopening an already-open task is an error, never a silent no-op.
    pub async fn reopen(&self, bearer: &str, id: Uuid) -> Result<Task, LifecycleError> {
        let actor = self.authorize(bearer).await?;

        let current = self
            .bounded(self.tasks.get(id))
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if current.status != TaskStatus::Completed {
            return Err(LifecycleError::InvalidTransition {
                from: current.status,
            });
        }

        let reopened = self
            .bounded(
                self.tasks
                    .set_status(id, Some(TaskStatus::Completed), TaskStatus::Open),
            )
            .await?;

        match reopened {
            Some(task) => {
                tracing::info!(task_id = %task.id, user_id = %actor.id, "Task reopened");
                Ok(task)
            }
            // Lost the race: the task left completed (or was deleted) after
            // our read.
            None => match self.bounded(self.tasks.get(id)).await? {
                Some(task) => Err(LifecycleError::InvalidTransition { from: task.status }),
                None => Err(LifecycleError::NotFound),
            },
        }
    }

    /// Lists tasks; closed records are excluded unless requested
    pub async fn list(
        &self,
        bearer: &str,
        include_closed: bool,
    ) -> Result<Vec<Task>, LifecycleError> {
        self.authorize(bearer).await?;
        self.bounded(self.tasks.list(include_closed)).await
    }

    /// Verifies the bearer token within the operation timeout
    ///
    /// Store failures during verification are transient, not an
    /// authorization verdict.
    async fn authorize(&self, bearer: &str) -> Result<User, LifecycleError> {
        match tokio::time::timeout(self.op_timeout, self.tokens.verify(bearer)).await {
            Ok(Ok(user)) => Ok(user),
            Ok(Err(AuthError::Store(e))) => Err(LifecycleError::Transient(e.to_string())),
            Ok(Err(e)) => Err(LifecycleError::Unauthorized(e.to_string())),
            Err(_) => Err(LifecycleError::Transient(
                "Token verification timed out".to_string(),
            )),
        }
    }

    /// Bounds a store call by the operation timeout
    async fn bounded<T, F>(&self, fut: F) -> Result<T, LifecycleError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(LifecycleError::Transient(
                "Store operation timed out".to_string(),
            )),
        }
    }
}
