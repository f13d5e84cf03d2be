//! HTTP client for the REST API.
//!
//! `TasksRemote` is the seam the synced store talks through; `ApiClient` is
//! the real implementation, tests substitute stubs. Non-2xx responses are
//! errors; the store decides what failures mean.

use crate::models::{
    CreateTaskRequest, LoginRequest, Message, SignupRequest, Task, ToggleTaskResponse,
    UpdateProfileRequest, UpdateTaskRequest, User,
};
use crate::store::TaskDraft;
use reqwest::Client;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[allow(async_fn_in_trait)]
pub trait TasksRemote {
    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError>;
    async fn update_task(&self, id: &str, patch: &UpdateTaskRequest) -> Result<(), ClientError>;
    async fn delete_task(&self, id: &str) -> Result<(), ClientError>;
    async fn toggle_task(&self, id: &str) -> Result<bool, ClientError>;
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        ApiClient::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { http: Client::new(), base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Auth calls

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, ClientError> {
        let body = SignupRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let user = self
            .http
            .post(self.url("/auth/signup"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let user = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(user)
    }

    pub async fn update_profile(&self, user_id: &str, name: &str) -> Result<Message, ClientError> {
        let body = UpdateProfileRequest {
            user_id: Some(user_id.to_string()),
            name: Some(name.to_string()),
        };
        let message = self
            .http
            .post(self.url("/auth/update-profile"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(message)
    }
}

/// The create body carries everything but the id; the server issues that.
fn create_body(draft: &TaskDraft) -> CreateTaskRequest {
    CreateTaskRequest {
        user_id: Some(draft.user_id.clone()),
        title: Some(draft.title.clone()),
        description: draft.description.clone(),
        priority: draft.priority,
        deadline: draft.deadline,
        subject: draft.subject.clone(),
        completed: draft.completed,
    }
}

impl TasksRemote for ApiClient {
    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, ClientError> {
        let tasks = self
            .http
            .get(self.url(&format!("/acadtasks/user/{user_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(tasks)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let task = self
            .http
            .post(self.url("/acadtasks"))
            .json(&create_body(draft))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &UpdateTaskRequest) -> Result<(), ClientError> {
        self.http
            .put(self.url(&format!("/acadtasks/{id}")))
            .json(patch)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        self.http
            .delete(self.url(&format!("/acadtasks/{id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn toggle_task(&self, id: &str) -> Result<bool, ClientError> {
        let resp: ToggleTaskResponse = self
            .http
            .patch(self.url(&format!("/acadtasks/{id}/toggle")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.completed)
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ClientError::Status(status.as_u16())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "transport: {e}"),
            ClientError::Status(code) => write!(f, "server returned {code}"),
            ClientError::Decode(e) => write!(f, "decode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
