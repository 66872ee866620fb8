//! crates/task_keeper_core/src/store.rs
//!
//! The user-scoped store: the single source of truth for the authorization marker
//! and every user's task collection.
//!
//! The store keeps an in-memory snapshot and mirrors it to a `KeyValueStorage`
//! under two independent keys. Every mutation holds the store lock across its whole
//! read-modify-write. It edits a copy of the cached users and writes the copy out.
//! Only after the medium accepts the write does the copy replace the cache, so a
//! failed write leaves memory and medium in agreement.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::domain::{StoreSnapshot, Task, UserProfile, UserRecord};
use crate::listing::sort_by_newest;
use crate::ports::{KeyValueStorage, PortError};

/// Key of the active user's identifier.
pub const USER_AUTHORIZED_KEY: &str = "user_authorized";
/// Key of the JSON array of user records.
pub const USERS_KEY: &str = "users";

//=========================================================================================
// Store Error and Result Types
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage medium failed: {0}")]
    Storage(#[from] PortError),
    #[error("Stored users could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("User {0} already exists")]
    UserAlreadyExists(String),
    #[error("Task {task_id} not found for user {user_id}")]
    TaskNotFound { user_id: String, task_id: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// The Store
//=========================================================================================

pub struct UserStore {
    storage: Arc<dyn KeyValueStorage>,
    state: Mutex<StoreSnapshot>,
}

fn find_user(users: &[UserRecord], user_id: &str) -> Option<usize> {
    users.iter().position(|record| record.user_id() == user_id)
}

fn find_task<'a>(record: &'a mut UserRecord, task_id: &str) -> StoreResult<&'a mut Task> {
    let user_id = record.user.user_id.clone();
    record
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| StoreError::TaskNotFound {
            user_id,
            task_id: task_id.to_string(),
        })
}

impl UserStore {
    /// Creates an empty store. Nothing is read from the medium until
    /// `get_authorized_state` / `get_users_data` are called.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            state: Mutex::new(StoreSnapshot::default()),
        }
    }

    /// A copy of the cached snapshot.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.clone()
    }

    /// The cached authorization marker, without touching the medium.
    pub async fn authorized_state(&self) -> Option<String> {
        self.state.lock().await.authorized_state.clone()
    }

    // --- Authorization marker ---

    pub async fn set_authorized_state(&self, user_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.storage
            .set(USER_AUTHORIZED_KEY, user_id)
            .await
            .inspect_err(|e| error!(error = %e, "Error setting authorized state"))?;
        state.authorized_state = Some(user_id.to_string());
        Ok(())
    }

    pub async fn get_authorized_state(&self) -> StoreResult<Option<String>> {
        let mut state = self.state.lock().await;
        let authorized = self
            .storage
            .get(USER_AUTHORIZED_KEY)
            .await
            .inspect_err(|e| error!(error = %e, "Error retrieving authorized state"))?;
        state.authorized_state = authorized.clone();
        Ok(authorized)
    }

    pub async fn remove_authorized_state(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.storage
            .remove(USER_AUTHORIZED_KEY)
            .await
            .inspect_err(|e| error!(error = %e, "Error removing authorized state"))?;
        state.authorized_state = None;
        Ok(())
    }

    // --- User records ---

    /// Replaces the profile of an existing record, or appends a record with an
    /// empty task collection. Never seeds tasks.
    pub async fn set_user_data(&self, profile: UserProfile) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let mut users = state.users.clone();
        match find_user(&users, &profile.user_id) {
            Some(index) => users[index].user = profile,
            None => users.push(UserRecord::new(profile)),
        }
        self.write_users(&users)
            .await
            .inspect_err(|e| error!(error = %e, "Error saving user data"))?;
        state.users = users;
        Ok(())
    }

    /// Appends a brand-new record holding its initial tasks. Profile and tasks
    /// reach the medium in a single write, so a failure leaves no partial record.
    pub async fn create_user(&self, profile: UserProfile, tasks: Vec<Task>) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let user_id = profile.user_id.clone();
        if find_user(&state.users, &user_id).is_some() {
            error!(user_id = %user_id, "Refusing to create a user that already exists");
            return Err(StoreError::UserAlreadyExists(user_id));
        }
        let mut users = state.users.clone();
        users.push(UserRecord { user: profile, tasks });
        self.write_users(&users)
            .await
            .inspect_err(|e| error!(user_id = %user_id, error = %e, "Error creating user"))?;
        state.users = users;
        Ok(())
    }

    /// Reloads every user record from the medium. The cache is overwritten, not merged.
    pub async fn get_users_data(&self) -> StoreResult<Vec<UserRecord>> {
        let mut state = self.state.lock().await;
        let users = self
            .read_users()
            .await
            .inspect_err(|e| error!(error = %e, "Error retrieving users data"))?;
        state.users = users.clone();
        Ok(users)
    }

    /// Cache-only lookup by identifier.
    pub async fn get_user_data(&self, user_id: &str) -> Option<UserRecord> {
        let state = self.state.lock().await;
        find_user(&state.users, user_id).map(|index| state.users[index].clone())
    }

    /// Drops every cached record. The medium keeps them; `get_users_data` brings them back.
    pub async fn evict_cached_users(&self) {
        self.state.lock().await.users.clear();
    }

    /// Deletes the whole `users` entry and empties the cache.
    pub async fn clear_user_data(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.storage
            .remove(USERS_KEY)
            .await
            .inspect_err(|e| error!(error = %e, "Error clearing user data"))?;
        state.users.clear();
        Ok(())
    }

    // --- Tasks ---

    pub async fn set_user_tasks(&self, user_id: &str, tasks: Vec<Task>) -> StoreResult<()> {
        self.update_user(user_id, |record| {
            record.tasks = tasks;
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, error = %e, "Error saving user tasks"))
    }

    /// The user's tasks, newest first. Empty when the user is unknown.
    pub async fn get_user_tasks(&self, user_id: &str) -> Vec<Task> {
        let mut tasks = self
            .get_user_data(user_id)
            .await
            .map(|record| record.tasks)
            .unwrap_or_default();
        sort_by_newest(&mut tasks);
        tasks
    }

    pub async fn add_user_task(&self, user_id: &str, task: Task) -> StoreResult<()> {
        self.update_user(user_id, |record| {
            record.tasks.push(task);
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, error = %e, "Error adding user task"))
    }

    /// Removing an id the user does not have is a no-op.
    pub async fn remove_user_task(&self, user_id: &str, task_id: &str) -> StoreResult<()> {
        self.update_user(user_id, |record| {
            record.tasks.retain(|task| task.id != task_id);
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, task_id, error = %e, "Error removing user task"))
    }

    pub async fn complete_user_task(&self, user_id: &str, task_id: &str) -> StoreResult<()> {
        self.update_user(user_id, |record| {
            find_task(record, task_id)?.complete();
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, task_id, error = %e, "Error completing user task"))
    }

    pub async fn open_user_task(&self, user_id: &str, task_id: &str) -> StoreResult<()> {
        self.update_user(user_id, |record| {
            find_task(record, task_id)?.reopen();
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, task_id, error = %e, "Error opening user task"))
    }

    /// First view of a task: a pending task becomes opened, anything else is
    /// left alone. Returns the task as it now stands.
    pub async fn view_user_task(&self, user_id: &str, task_id: &str) -> StoreResult<Task> {
        self.update_user(user_id, |record| {
            let task = find_task(record, task_id)?;
            task.mark_viewed();
            Ok(task.clone())
        })
        .await
        .inspect_err(|e| error!(user_id, task_id, error = %e, "Error viewing user task"))
    }

    /// Completes every listed task in one write. Unknown ids are skipped.
    pub async fn complete_user_tasks_bulk(
        &self,
        user_id: &str,
        task_ids: &[String],
    ) -> StoreResult<()> {
        let wanted: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
        self.update_user(user_id, |record| {
            record
                .tasks
                .iter_mut()
                .filter(|task| wanted.contains(task.id.as_str()))
                .for_each(Task::complete);
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, error = %e, "Error completing user tasks in bulk"))
    }

    /// Removes every listed task in one write. Unknown ids are skipped.
    pub async fn remove_user_tasks_bulk(
        &self,
        user_id: &str,
        task_ids: &[String],
    ) -> StoreResult<()> {
        let wanted: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
        self.update_user(user_id, |record| {
            record.tasks.retain(|task| !wanted.contains(task.id.as_str()));
            Ok(())
        })
        .await
        .inspect_err(|e| error!(user_id, error = %e, "Error removing user tasks in bulk"))
    }

    //=====================================================================================
    // Medium plumbing
    //=====================================================================================

    /// Read-modify-write of one user record under the store lock. The write is
    /// skipped when `apply` leaves the record unchanged.
    async fn update_user<T>(
        &self,
        user_id: &str,
        apply: impl FnOnce(&mut UserRecord) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut state = self.state.lock().await;
        let index = find_user(&state.users, user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_string()))?;

        let mut users = state.users.clone();
        let value = apply(&mut users[index])?;
        if users[index] == state.users[index] {
            return Ok(value);
        }

        self.write_users(&users).await?;
        state.users = users;
        Ok(value)
    }

    async fn read_users(&self) -> StoreResult<Vec<UserRecord>> {
        match self.storage.get(USERS_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_users(&self, users: &[UserRecord]) -> StoreResult<()> {
        let json = serde_json::to_string(users)?;
        self.storage.set(USERS_KEY, &json).await?;
        debug!(users = users.len(), bytes = json.len(), "Persisted users");
        Ok(())
    }
}
