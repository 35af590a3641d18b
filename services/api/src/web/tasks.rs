//! services/api/src/web/tasks.rs
//!
//! Task CRUD. Every query is scoped to the authenticated uid, so another
//! user's task id answers 404 exactly like an unknown one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use std::sync::Arc;
use studentflow_core::domain::{NewTask, Task, TaskStatus, TaskUpdate, UserId};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::{reply, ApiJson, Reply};
use crate::web::state::AppState;

/// List the caller's tasks, earliest deadline first.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "Tasks fetched successfully", body = [Task]),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
) -> Result<Reply<Vec<Task>>, ApiError> {
    let tasks = state.db.list_tasks(&uid).await?;
    Ok(reply(StatusCode::OK, tasks, "Tasks fetched successfully"))
}

/// Create a task. New tasks start out pending.
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    ApiJson(mut new_task): ApiJson<NewTask>,
) -> Result<Reply<Task>, ApiError> {
    new_task.title = new_task.title.trim().to_string();
    if new_task.title.is_empty() {
        return Err(ApiError::validation("Task title is required"));
    }
    let task = state.db.create_task(&uid, new_task).await?;
    info!("Created task {} for {}", task.id, uid);
    Ok(reply(StatusCode::CREATED, task, "Task created successfully"))
}

/// Edit any subset of a task's fields.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    request_body = TaskUpdate,
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, description = "No fields to update"),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer" = []))
)]
pub async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    Path(task_id): Path<Uuid>,
    ApiJson(update): ApiJson<TaskUpdate>,
) -> Result<Reply<Task>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }
    if matches!(&update.title, Some(title) if title.trim().is_empty()) {
        return Err(ApiError::validation("Task title must not be empty"));
    }
    let task = state.db.update_task(&uid, task_id, update).await?;
    Ok(reply(StatusCode::OK, task, "Task updated successfully"))
}

async fn set_status(
    state: &AppState,
    uid: &UserId,
    task_id: Uuid,
    status: TaskStatus,
) -> Result<Task, ApiError> {
    Ok(state
        .db
        .update_task(uid, task_id, TaskUpdate::status(status))
        .await?)
}

/// Mark a task as completed.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}/complete",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task marked as completed", body = Task),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer" = []))
)]
pub async fn complete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    Path(task_id): Path<Uuid>,
) -> Result<Reply<Task>, ApiError> {
    let task = set_status(&state, &uid, task_id, TaskStatus::Completed).await?;
    Ok(reply(StatusCode::OK, task, "Task marked as completed"))
}

/// Move a task back to pending.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}/uncomplete",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task marked as pending", body = Task),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer" = []))
)]
pub async fn uncomplete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    Path(task_id): Path<Uuid>,
) -> Result<Reply<Task>, ApiError> {
    let task = set_status(&state, &uid, task_id, TaskStatus::Pending).await?;
    Ok(reply(StatusCode::OK, task, "Task marked as pending"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted successfully"),
        (status = 404, description = "No such task for this user")
    ),
    security(("bearer" = []))
)]
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Extension(uid): Extension<UserId>,
    Path(task_id): Path<Uuid>,
) -> Result<Reply<()>, ApiError> {
    state.db.delete_task(&uid, task_id).await?;
    info!("Deleted task {} for {}", task_id, uid);
    Ok(reply(StatusCode::OK, (), "Task deleted successfully"))
}
