//! Task HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use taskdeck_core::{parse_id, AttachmentInput, CreateTaskRequest, DeletedTasks, Task};

use super::projects::StatusBody;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

/// Request body for creating a task or subtask.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// One of the task status values; defaults to `todo`.
    pub status: Option<String>,
    /// Owning task when creating a subtask.
    pub parent_task: Option<String>,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        Self {
            project_id: body.project_id,
            title: body.title,
            description: body.description,
            status: body.status,
            parent_task: body.parent_task,
        }
    }
}

/// Request body for adding attachment metadata.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub size: Option<i64>,
}

impl From<AttachmentBody> for AttachmentInput {
    fn from(body: AttachmentBody) -> Self {
        Self {
            name: body.name,
            url: body.url,
            content_type: body.content_type,
            size: body.size,
            uploaded_at: None,
        }
    }
}

/// Create a task.
///
/// # Returns
/// - 201 Created with the stored task
/// - 400 Bad Request on missing project id or title, or a bad status
/// - 404 Not Found when the project or parent task does not exist
/// - 409 Conflict when the parent belongs to another project
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<Task>), ApiError> {
    let Json(body) = payload?;
    let task = state.tasks.create(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(task).with_message("Task created successfully"),
    ))
}

/// Task detail with project title and subtasks.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let id = parse_id("task", &id)?;
    Ok(ApiResponse::ok(state.tasks.detail_view(id).await?))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusBody>, JsonRejection>,
) -> Result<ApiResponse<Task>, ApiError> {
    let id = parse_id("task", &id)?;
    let Json(body) = payload?;
    let task = state.tasks.update_status(id, &body.status).await?;
    Ok(ApiResponse::ok(task).with_message("Task status updated successfully"))
}

pub async fn add_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AttachmentBody>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<Task>), ApiError> {
    let id = parse_id("task", &id)?;
    let Json(body) = payload?;
    let task = state.tasks.add_attachment(id, body.into()).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(task).with_message("Attachment added successfully"),
    ))
}

/// Delete a task and its subtask tree.
///
/// # Returns
/// - 200 OK with `{deleted: [ids]}`, root first
/// - 404 Not Found
/// - 409 Conflict when the subtask references form a cycle
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<DeletedTasks>, ApiError> {
    let id = parse_id("task", &id)?;
    let deleted = state.tasks.delete(id).await?;
    Ok(ApiResponse::ok(deleted).with_message("Task deleted successfully"))
}
