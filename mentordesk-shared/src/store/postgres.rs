/// Postgres-backed store
///
/// Thin adapter that satisfies the store traits by delegating to the
/// model-level queries. Atomicity per call comes from single SQL statements
/// (or a transaction for the profile aggregate); duplicate-key violations on
/// users are translated into `StoreError::Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, ProfileStore, StoreError, TaskStore};
use crate::models::profile::{NewProfile, NewSocialLink, Profile, SocialLink};
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::models::user::{NewUser, User};

/// Production store over a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access to the underlying pool (health checks, migrations)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique-constraint violations to `Conflict`, everything else through
fn map_user_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("email") {
                return StoreError::Conflict("Email already in use".to_string());
            }
            if constraint.contains("username") {
                return StoreError::Conflict("Username already in use".to_string());
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        User::create(&self.pool, user).await.map_err(map_user_error)
    }

    async fn change_secret(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError> {
        Ok(User::change_password_hash(&self.pool, id, new_hash).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn get(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: TaskPatch,
        expect: Option<TaskStatus>,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::update_fields(&self.pool, id, patch, expect).await?)
    }

    async fn set_status(
        &self,
        id: Uuid,
        expect: Option<TaskStatus>,
        target: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        Ok(Task::set_status(&self.pool, id, expect, target).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn list(&self, include_closed: bool) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list(&self.pool, include_closed).await?)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create(&self, user_id: Uuid, data: NewProfile) -> Result<Profile, StoreError> {
        Ok(Profile::create(&self.pool, user_id, data).await?)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(Profile::find_by_user(&self.pool, user_id).await?)
    }

    async fn add_social_link(
        &self,
        profile_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError> {
        Ok(Profile::add_social_link(&self.pool, profile_id, link).await?)
    }

    async fn remove_social_link(
        &self,
        profile_id: Uuid,
        link_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(Profile::remove_social_link(&self.pool, profile_id, link_id).await?)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(Profile::delete_by_user(&self.pool, user_id).await?)
    }
}
