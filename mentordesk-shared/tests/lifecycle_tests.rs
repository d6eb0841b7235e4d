/// Lifecycle engine tests over the in-memory store
///
/// These exercise the engine's gate ordering (authorization, then existence,
/// then state preconditions), the transition table, and the race behavior
/// the store's check-and-set writes are supposed to deliver.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use mentordesk_shared::auth::token::TokenService;
use mentordesk_shared::lifecycle::{LifecycleEngine, LifecycleError, TaskDraft};
use mentordesk_shared::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use mentordesk_shared::models::user::{NewUser, User};
use mentordesk_shared::store::memory::MemoryStore;
use mentordesk_shared::store::{CredentialStore, StoreError, TaskStore};

const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

struct Harness {
    engine: LifecycleEngine,
    store: Arc<MemoryStore>,
    token: String,
    user: User,
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());

    let user = CredentialStore::create(
        store.as_ref(),
        NewUser {
            email: "admin@example.com".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
        },
    )
    .await
    .unwrap();

    let tokens = TokenService::new(SECRET, Duration::hours(1), store.clone() as Arc<dyn CredentialStore>);
    let token = tokens.issue(&user).unwrap();
    let engine = LifecycleEngine::new(store.clone() as Arc<dyn TaskStore>, tokens);

    Harness {
        engine,
        store,
        token,
        user,
    }
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "".to_string(),
    }
}

#[tokio::test]
async fn test_create_starts_open() {
    let h = harness().await;

    let task = h.engine.create(&h.token, draft("review mentee goals")).await.unwrap();

    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(task.created_by, Some(h.user.id));
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let h = harness().await;

    let result = h.engine.create(&h.token, draft("   ")).await;
    assert!(matches!(result, Err(LifecycleError::Validation(_))));
}

#[tokio::test]
async fn test_authorization_precedes_existence() {
    // An invalid token gets Unauthorized even for a task that does not
    // exist, so unauthenticated callers cannot probe for valid IDs.
    let h = harness().await;

    let result = h.engine.reopen("not.a.token", Uuid::new_v4()).await;
    assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));

    let result = h.engine.soft_close("not.a.token", Uuid::new_v4()).await;
    assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));

    let result = h.engine.hard_delete("not.a.token", Uuid::new_v4()).await;
    assert!(matches!(result, Err(LifecycleError::Unauthorized(_))));
}

#[tokio::test]
async fn test_existence_precedes_state_precondition() {
    // Reopen on a missing task is NotFound, never InvalidTransition.
    let h = harness().await;

    let result = h.engine.reopen(&h.token, Uuid::new_v4()).await;
    assert!(matches!(result, Err(LifecycleError::NotFound)));
}

#[tokio::test]
async fn test_reopen_open_task_is_rejected() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("still open")).await.unwrap();

    let result = h.engine.reopen(&h.token, task.id).await;
    assert!(matches!(
        result,
        Err(LifecycleError::InvalidTransition {
            from: TaskStatus::Open
        })
    ));
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    // create → OPEN; complete via update → COMPLETED; reopen → OPEN;
    // reopen again → InvalidTransition.
    let h = harness().await;

    let task = h.engine.create(&h.token, draft("walkthrough")).await.unwrap();
    assert_eq!(task.status, TaskStatus::Open);

    let completed = h
        .engine
        .update(
            &h.token,
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);

    let reopened = h.engine.reopen(&h.token, task.id).await.unwrap();
    assert_eq!(reopened.status, TaskStatus::Open);

    let again = h.engine.reopen(&h.token, task.id).await;
    assert!(matches!(
        again,
        Err(LifecycleError::InvalidTransition {
            from: TaskStatus::Open
        })
    ));
}

#[tokio::test]
async fn test_update_edits_fields_without_touching_status() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("old title")).await.unwrap();

    let updated = h
        .engine
        .update(
            &h.token,
            task.id,
            TaskPatch {
                title: Some("new title".to_string()),
                description: Some("now with details".to_string()),
                status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "new title");
    assert_eq!(updated.description, "now with details");
    assert_eq!(updated.status, TaskStatus::Open);
}

#[tokio::test]
async fn test_update_rejects_empty_patch() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("t")).await.unwrap();

    let result = h.engine.update(&h.token, task.id, TaskPatch::default()).await;
    assert!(matches!(result, Err(LifecycleError::Validation(_))));
}

#[tokio::test]
async fn test_update_rejects_illegal_status_edit() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("t")).await.unwrap();
    h.engine.soft_close(&h.token, task.id).await.unwrap();

    // Closed tasks never come back through a plain status edit
    let result = h
        .engine
        .update(
            &h.token,
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Open),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(LifecycleError::InvalidTransition {
            from: TaskStatus::Closed
        })
    ));
}

#[tokio::test]
async fn test_soft_close_retains_record() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("to close")).await.unwrap();

    let closed = h.engine.soft_close(&h.token, task.id).await.unwrap();
    assert_eq!(closed.status, TaskStatus::Closed);

    // Still queryable through the store
    let stored = h.store.get(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Closed);

    // But excluded from active listings
    let active = h.engine.list(&h.token, false).await.unwrap();
    assert!(active.iter().all(|t| t.id != task.id));

    let all = h.engine.list(&h.token, true).await.unwrap();
    assert!(all.iter().any(|t| t.id == task.id));
}

#[tokio::test]
async fn test_hard_delete_removes_record() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("to delete")).await.unwrap();

    h.engine.hard_delete(&h.token, task.id).await.unwrap();

    assert!(h.store.get(task.id).await.unwrap().is_none());

    // Any further operation on the ID is NotFound
    let result = h.engine.soft_close(&h.token, task.id).await;
    assert!(matches!(result, Err(LifecycleError::NotFound)));
}

#[tokio::test]
async fn test_completed_tasks_stay_in_active_listing() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("done soon")).await.unwrap();

    h.engine
        .update(
            &h.token,
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let active = h.engine.list(&h.token, false).await.unwrap();
    assert!(active.iter().any(|t| t.id == task.id));
}

#[tokio::test]
async fn test_concurrent_soft_close_single_terminal_state() {
    // Two racing soft-closes both come back cleanly and the task ends in
    // exactly one consistent terminal state.
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("contended")).await.unwrap();

    let (a, b) = tokio::join!(
        h.engine.soft_close(&h.token, task.id),
        h.engine.soft_close(&h.token, task.id),
    );

    for outcome in [a, b] {
        match outcome {
            Ok(t) => assert_eq!(t.status, TaskStatus::Closed),
            Err(LifecycleError::NotFound) => {}
            Err(e) => panic!("unexpected outcome: {e}"),
        }
    }

    let stored = h.store.get(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Closed);
}

#[tokio::test]
async fn test_concurrent_reopen_only_one_wins() {
    let h = harness().await;
    let task = h.engine.create(&h.token, draft("contended reopen")).await.unwrap();
    h.engine
        .update(
            &h.token,
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        h.engine.reopen(&h.token, task.id),
        h.engine.reopen(&h.token, task.id),
    );

    let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert!(wins >= 1, "at least one reopen must win");

    for outcome in [a, b] {
        match outcome {
            Ok(t) => assert_eq!(t.status, TaskStatus::Open),
            Err(LifecycleError::InvalidTransition { from }) => assert_eq!(from, TaskStatus::Open),
            Err(e) => panic!("unexpected outcome: {e}"),
        }
    }

    let stored = h.store.get(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Open);
}

/// Task store that stalls long enough to trip the engine's timeout
struct StallingStore {
    inner: MemoryStore,
    delay: StdDuration,
}

#[async_trait]
impl TaskStore for StallingStore {
    async fn get(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(id).await
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(task).await
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: TaskPatch,
        expect: Option<TaskStatus>,
    ) -> Result<Option<Task>, StoreError> {
        self.inner.update_fields(id, patch, expect).await
    }

    async fn set_status(
        &self,
        id: Uuid,
        expect: Option<TaskStatus>,
        target: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        self.inner.set_status(id, expect, target).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        TaskStore::delete(&self.inner, id).await
    }

    async fn list(&self, include_closed: bool) -> Result<Vec<Task>, StoreError> {
        self.inner.list(include_closed).await
    }
}

#[tokio::test]
async fn test_store_timeout_is_transient() {
    let users = Arc::new(MemoryStore::new());
    let user = CredentialStore::create(
        users.as_ref(),
        NewUser {
            email: "slow@example.com".to_string(),
            username: "slow".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            first_name: "S".to_string(),
            last_name: "Low".to_string(),
        },
    )
    .await
    .unwrap();

    let tokens = TokenService::new(SECRET, Duration::hours(1), users as Arc<dyn CredentialStore>);
    let token = tokens.issue(&user).unwrap();

    let stalling = Arc::new(StallingStore {
        inner: MemoryStore::new(),
        delay: StdDuration::from_millis(200),
    });
    let engine = LifecycleEngine::with_timeout(
        stalling as Arc<dyn TaskStore>,
        tokens,
        StdDuration::from_millis(10),
    );

    // Distinct from Unauthorized and NotFound: the caller may retry.
    let result = engine.create(&token, draft("never lands")).await;
    assert!(matches!(result, Err(LifecycleError::Transient(_))));

    let result = engine.reopen(&token, Uuid::new_v4()).await;
    assert!(matches!(result, Err(LifecycleError::Transient(_))));
}
