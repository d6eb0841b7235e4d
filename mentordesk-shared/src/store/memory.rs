/// In-memory store for tests and local development
///
/// Backs each trait with a mutex-guarded map. Holding the lock across a
/// read-modify-write gives the same per-record serialization the Postgres
/// store gets from conditional UPDATEs, so lifecycle race tests exercise
/// real check-and-set semantics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{CredentialStore, ProfileStore, StoreError, TaskStore};
use crate::models::profile::{NewProfile, NewSocialLink, Profile, SocialLink};
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::models::user::{NewUser, User};

/// Mutex-guarded map store
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
    tasks: Mutex<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("users lock");
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().expect("users lock");

        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict("Email already in use".to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("Username already in use".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn change_secret(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().expect("users lock");
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = new_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.lock().expect("users lock");
        Ok(users.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.lock().expect("tasks lock");
        Ok(tasks.get(&id).cloned())
    }

    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");

        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            created_by: task.created_by,
            title: task.title,
            description: task.description,
            status: TaskStatus::Open,
            created_at: now,
            updated_at: now,
        };
        tasks.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        patch: TaskPatch,
        expect: Option<TaskStatus>,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");

        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(expected) = expect {
            if task.status != expected {
                return Ok(None);
            }
        }

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn set_status(
        &self,
        id: Uuid,
        expect: Option<TaskStatus>,
        target: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");

        let Some(task) = tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(expected) = expect {
            if task.status != expected {
                return Ok(None);
            }
        }

        task.status = target;
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.lock().expect("tasks lock");
        Ok(tasks.remove(&id).is_some())
    }

    async fn list(&self, include_closed: bool) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().expect("tasks lock");
        let mut listed: Vec<Task> = tasks
            .values()
            .filter(|t| include_closed || t.status.is_active())
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn create(&self, user_id: Uuid, data: NewProfile) -> Result<Profile, StoreError> {
        let mut profiles = self.profiles.lock().expect("profiles lock");

        if profiles.values().any(|p| p.user_id == user_id) {
            return Err(StoreError::Conflict("Profile already exists".to_string()));
        }

        let now = Utc::now();
        let created = Profile {
            id: Uuid::new_v4(),
            user_id,
            about: data.about,
            website: data.website,
            is_mentor: data.is_mentor,
            is_mentor_manager: data.is_mentor_manager,
            location: data.location,
            social_links: data
                .social_links
                .into_iter()
                .map(|link| SocialLink {
                    id: Uuid::new_v4(),
                    name: link.name,
                    url: link.url,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };
        profiles.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profiles = self.profiles.lock().expect("profiles lock");
        Ok(profiles.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn add_social_link(
        &self,
        profile_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError> {
        let mut profiles = self.profiles.lock().expect("profiles lock");

        let profile = profiles
            .get_mut(&profile_id)
            .ok_or_else(|| StoreError::Unavailable("Profile not found".to_string()))?;

        let created = SocialLink {
            id: Uuid::new_v4(),
            name: link.name,
            url: link.url,
        };
        profile.social_links.push(created.clone());
        profile.updated_at = Utc::now();

        Ok(created)
    }

    async fn remove_social_link(
        &self,
        profile_id: Uuid,
        link_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.lock().expect("profiles lock");

        let Some(profile) = profiles.get_mut(&profile_id) else {
            return Ok(false);
        };

        let before = profile.social_links.len();
        profile.social_links.retain(|l| l.id != link_id);
        Ok(profile.social_links.len() < before)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.lock().expect("profiles lock");
        let before = profiles.len();
        profiles.retain(|_, p| p.user_id != user_id);
        Ok(profiles.len() < before)
    }
}
