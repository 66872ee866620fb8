//! crates/task_keeper_core/src/domain.rs
//!
//! Defines the core data structures for the application: tasks, the profile a
//! login yields, and the record pairing the two. The serde shapes here are the
//! persisted layout of the `users` entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Task Status
//=========================================================================================

/// Lifecycle state of a task.
///
/// Anything read from storage that is not one of the three known values is kept
/// verbatim in `Other`, so a round trip through the store never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pendente,
    Aberta,
    Concluida,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pendente => "Pendente",
            TaskStatus::Aberta => "Aberta",
            TaskStatus::Concluida => "Concluida",
            TaskStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pendente" => TaskStatus::Pendente,
            "Aberta" => TaskStatus::Aberta,
            "Concluida" => TaskStatus::Concluida,
            _ => TaskStatus::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing a status name typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a task status (expected pendente, aberta or concluida)")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    /// Case-insensitive parse of the three known statuses. Unlike deserialization,
    /// this never produces `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendente" => Ok(TaskStatus::Pendente),
            "aberta" => Ok(TaskStatus::Aberta),
            "concluida" => Ok(TaskStatus::Concluida),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

//=========================================================================================
// Task
//=========================================================================================

/// One unit of work owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task with a fresh id, stamped with the current time.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pendente,
            created_at: Utc::now(),
        }
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Concluida;
    }

    /// Explicit re-open. Also used for a completed task brought back to work.
    pub fn reopen(&mut self) {
        self.status = TaskStatus::Aberta;
    }

    /// First view of a pending task opens it. Returns whether the status changed.
    pub fn mark_viewed(&mut self) -> bool {
        if self.status == TaskStatus::Pendente {
            self.status = TaskStatus::Aberta;
            true
        } else {
            false
        }
    }
}

//=========================================================================================
// Task Draft (the creation form's collaborator)
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Description,
}

impl DraftField {
    fn message(self) -> &'static str {
        match self {
            DraftField::Title => "the title is required",
            DraftField::Description => "the description is required",
        }
    }
}

/// Every blank field of a rejected draft, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRejected {
    pub missing: Vec<DraftField>,
}

impl fmt::Display for DraftRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.missing.iter().map(|field| field.message()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for DraftRejected {}

/// User input for a new task, before it becomes a `Task`.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Checks both fields and builds the pending task when neither is blank.
    pub fn into_task(self) -> Result<Task, DraftRejected> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push(DraftField::Title);
        }
        if self.description.trim().is_empty() {
            missing.push(DraftField::Description);
        }
        if !missing.is_empty() {
            return Err(DraftRejected { missing });
        }
        Ok(Task::new(self.title, self.description))
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// The profile a successful login yields. `user_id` is the join key into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "usuarioId", deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(rename = "usuarioNome", default)]
    pub name: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Identity providers hand the user id out either as a number or a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Pairs one profile with that user's tasks. Storage order of `tasks` carries no
/// meaning; listings always sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user: UserProfile,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl UserRecord {
    pub fn new(user: UserProfile) -> Self {
        Self {
            user,
            tasks: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }
}

/// The full persisted state, as held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub authorized_state: Option<String>,
    pub users: Vec<UserRecord>,
}
