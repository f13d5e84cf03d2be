//! Task routes.
//!
//! JSON error bodies keep the `{"message": ...}` shape the SPA expects.
//! Identifier parsing happens here so a malformed id is a 400, not a 500.

use crate::auth::SharedState;
use crate::models::{
    CreateTaskRequest, Message, Task, TaskRecord, ToggleTaskResponse, UpdateTaskRequest,
    UpdateTaskResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub type ApiError = (StatusCode, Json<Message>);

pub fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error!(%e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(Message::new("Server error")))
}

fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        warn!(id = raw, "rejected malformed task id");
        (StatusCode::BAD_REQUEST, Json(Message::new("Invalid task ID format")))
    })
}

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(Message::new("Task not found")))
}

// GET /acadtasks
pub async fn list_tasks(State(state): State<SharedState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.db.list_tasks().map_err(internal_error)?;

    debug!(count = tasks.len(), "listed all tasks");
    Ok(Json(tasks.into_iter().map(|(id, record)| record.into_task(id)).collect()))
}

// GET /acadtasks/user/:userId
pub async fn list_user_tasks(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.db.list_tasks_by_user(&user_id).map_err(internal_error)?;

    info!(%user_id, count = tasks.len(), "listed user tasks");
    Ok(Json(tasks.into_iter().map(|(id, record)| record.into_task(id)).collect()))
}

// POST /acadtasks
pub async fn create_task(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let user_id = payload.user_id.as_deref().unwrap_or("").trim();
    let title = payload.title.as_deref().unwrap_or("").trim();
    if user_id.is_empty() || title.is_empty() {
        warn!("rejected task creation with missing userId or title");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(Message::new("User ID and title are required")),
        ));
    }

    let now = Utc::now();
    let record = TaskRecord {
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: payload.description,
        priority: payload.priority,
        deadline: payload.deadline,
        subject: payload.subject,
        completed: payload.completed,
        created_at: now,
        updated_at: now,
    };

    let id = state.db.create_task(&record).map_err(internal_error)?;
    info!(%id, title = %record.title, "task created");

    Ok((StatusCode::CREATED, Json(record.into_task(id))))
}

// PUT /acadtasks/:id
pub async fn update_task(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<UpdateTaskResponse>, ApiError> {
    let id = parse_task_id(&raw_id)?;

    let mut record = state
        .db
        .get_task(id)
        .map_err(internal_error)?
        .ok_or_else(not_found)?;

    // Apply updates
    if let Some(title) = payload.title {
        record.title = title;
    }
    if let Some(description) = payload.description {
        record.description = description;
    }
    if let Some(priority) = payload.priority {
        record.priority = priority;
    }
    if let Some(deadline) = payload.deadline {
        record.deadline = deadline;
    }
    if let Some(subject) = payload.subject {
        record.subject = subject;
    }
    if let Some(completed) = payload.completed {
        record.completed = completed;
    }
    record.updated_at = Utc::now();

    state.db.update_task(id, &record).map_err(internal_error)?;
    info!(%id, "task updated");

    Ok(Json(UpdateTaskResponse {
        message: "Task updated successfully".to_string(),
        id: raw_id,
    }))
}

// DELETE /acadtasks/:id
pub async fn delete_task(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_task_id(&raw_id)?;

    if !state.db.delete_task(id).map_err(internal_error)? {
        return Err(not_found());
    }

    info!(%id, "task deleted");
    Ok(Json(Message::new("Task deleted successfully")))
}

// PATCH /acadtasks/:id/toggle
pub async fn toggle_task(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ToggleTaskResponse>, ApiError> {
    let id = parse_task_id(&raw_id)?;

    let mut record = state
        .db
        .get_task(id)
        .map_err(internal_error)?
        .ok_or_else(not_found)?;

    record.completed = !record.completed;
    record.updated_at = Utc::now();
    let completed = record.completed;

    state.db.update_task(id, &record).map_err(internal_error)?;
    info!(%id, completed, "task completion toggled");

    Ok(Json(ToggleTaskResponse {
        message: "Task completion toggled successfully".to_string(),
        completed,
    }))
}

// ── Tests ──────────────────────────────────────────────────────
