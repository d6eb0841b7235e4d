/// Store seams consumed by the lifecycle engine and the HTTP gateway
///
/// Persistence mechanics sit behind three async traits so the engine never
/// sees a connection pool. Every trait method is atomic per call; per-task
/// serialization is delivered by compare-and-set writes on the status column
/// (Postgres `UPDATE ... WHERE status = ...`, a single mutex in the memory
/// store).
///
/// # Implementations
///
/// - [`postgres::PgStore`]: production store backed by sqlx/Postgres
/// - [`memory::MemoryStore`]: mutex-guarded maps for tests and local runs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::profile::{NewProfile, NewSocialLink, Profile, SocialLink};
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::models::user::{NewUser, User};

/// Error type shared by all store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violated (duplicate email/username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store unreachable or otherwise unable to serve the call
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// User identity and hashed-secret storage
///
/// The token service re-queries this store on every verification so that
/// account deletion takes effect without token-revocation bookkeeping.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Looks up a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Looks up a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Creates a user; fails with `Conflict` on duplicate email/username
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Replaces a user's password hash; false when the user is gone
    async fn change_secret(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError>;

    /// Removes a user; outstanding tokens die with the record because
    /// verification re-resolves the subject
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Task record storage
///
/// State-changing writes take an optional expected status and apply only
/// while the row still holds it, which is the check-and-set the engine
/// relies on for per-task serialization.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetches a task by ID, closed records included
    async fn get(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Inserts a new open task
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Applies a field patch; `expect` guards status-carrying patches
    async fn update_fields(
        &self,
        id: Uuid,
        patch: TaskPatch,
        expect: Option<TaskStatus>,
    ) -> Result<Option<Task>, StoreError>;

    /// Compare-and-set status change; `expect = None` matches any status
    async fn set_status(
        &self,
        id: Uuid,
        expect: Option<TaskStatus>,
        target: TaskStatus,
    ) -> Result<Option<Task>, StoreError>;

    /// Permanently removes a task; false when it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Lists tasks, excluding closed records unless asked for
    async fn list(&self, include_closed: bool) -> Result<Vec<Task>, StoreError>;
}

/// Profile aggregate storage
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates a profile with its location and social links atomically
    async fn create(&self, user_id: Uuid, data: NewProfile) -> Result<Profile, StoreError>;

    /// Loads a user's profile aggregate
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Attaches a social link to a profile
    async fn add_social_link(
        &self,
        profile_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError>;

    /// Detaches a social link; false when it did not belong to the profile
    async fn remove_social_link(&self, profile_id: Uuid, link_id: Uuid)
        -> Result<bool, StoreError>;

    /// Drops a user's profile with its children
    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError>;
}
