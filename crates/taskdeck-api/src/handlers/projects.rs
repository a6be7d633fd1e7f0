//! Project HTTP handlers.
//!
//! ```text
//! GET    /api/project              list, newest first
//! POST   /api/project              create
//! DELETE /api/project?id=<id>      delete (cascades to tasks)
//! GET    /api/project/{id}         detail with tasks
//! PATCH  /api/project/{id}/status  change status
//! ```

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use taskdeck_core::{parse_id, CreateProjectRequest, Project};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

/// Request body for creating a project.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    pub title: Option<String>,
    pub description: Option<String>,
    /// One of the project status values; defaults to `planning`.
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<CreateProjectBody> for CreateProjectRequest {
    fn from(body: CreateProjectBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            status: body.status,
            tags: body.tags,
        }
    }
}

/// Request body for status changes (projects and tasks).
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StatusBody {
    pub status: String,
}

/// Query parameters for deleting a project.
#[derive(Debug, Deserialize)]
pub struct DeleteProjectQuery {
    pub id: Option<String>,
}

/// List all projects, newest first.
///
/// # Returns
/// - 200 OK with `{success, data: Project[], count}`
pub async fn list_projects(State(state): State<AppState>) -> Result<ApiResponse<Value>, ApiError> {
    let view = state.projects.list_view().await?;
    let count = view.as_array().map(Vec::len).unwrap_or(0);
    Ok(ApiResponse::ok(view).with_count(count))
}

/// Create a project.
///
/// # Returns
/// - 201 Created with the stored project
/// - 400 Bad Request when the title is missing or a field fails validation
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectBody>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<Project>), ApiError> {
    let Json(body) = payload?;
    if body.title.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let project = state
        .projects
        .create(body.into())
        .await
        .map_err(ApiError::validation)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(project).with_message("Project created successfully"),
    ))
}

/// Delete a project by `?id=`.
///
/// # Returns
/// - 200 OK with the removed project
/// - 400 Bad Request when the id is missing or malformed
/// - 404 Not Found
pub async fn delete_project(
    State(state): State<AppState>,
    Query(query): Query<DeleteProjectQuery>,
) -> Result<ApiResponse<Project>, ApiError> {
    let raw = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Project ID is required".to_string()))?;
    let id = parse_id("project", &raw)?;

    let project = state.projects.delete(id).await?;
    Ok(ApiResponse::ok(project).with_message("Project deleted successfully"))
}

/// Project detail with its tasks.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let id = parse_id("project", &id)?;
    Ok(ApiResponse::ok(state.projects.detail_view(id).await?))
}

/// Change a project's status.
pub async fn update_project_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusBody>, JsonRejection>,
) -> Result<ApiResponse<Project>, ApiError> {
    let id = parse_id("project", &id)?;
    let Json(body) = payload?;
    let project = state.projects.update_status(id, &body.status).await?;
    Ok(ApiResponse::ok(project).with_message("Project status updated successfully"))
}
