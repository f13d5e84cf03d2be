use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A task as the client sees it. `id` is an opaque string: either a
/// server-issued UUID or, for an optimistic create that never reached the
/// server, a locally generated identifier that stays forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    /// Category id. May be dangling; display resolves it with a fallback.
    pub subject: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The persisted task document. Keyed by an internal UUID that is distinct
/// from the `id` string exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    pub subject: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn into_task(self, id: Uuid) -> Task {
        Task {
            id: id.to_string(),
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            deadline: self.deadline,
            subject: self.subject,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A subject grouping tasks. Client-local, never synced to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Hex swatch assigned at creation from a fixed palette.
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The persisted user document. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_user(self, id: Uuid) -> User {
        User {
            id: id.to_string(),
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

// API request/response types

/// `userId` and `title` are Options so their absence produces the API's own
/// 400 message instead of a deserialization rejection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default = "default_deadline")]
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub completed: bool,
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_deadline() -> DateTime<Utc> {
    Utc::now()
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub subject: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: &str) -> Self {
        Message { message: message.to_string() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTaskResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleTaskResponse {
    pub message: String,
    pub completed: bool,
}
