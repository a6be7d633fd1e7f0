//! Core traits for taskdeck abstractions.
//!
//! These traits define the interfaces that the PostgreSQL and in-memory
//! stores implement. Referential fields (`project.tasks`, `task.subtasks`,
//! `task.parentTask`, `task.projectId`) are plain ids: the store never
//! enforces them, the services keep them consistent.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::uuid_utils::parse_id;
use crate::validation::{Description, Tags, Title};

// =============================================================================
// PROJECT REPOSITORY TRAITS
// =============================================================================

/// Request for creating a new project, as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated project ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
}

impl CreateProjectRequest {
    /// Apply defaults (`planning`, no tags) and check every field.
    pub fn validate(self) -> Result<NewProject> {
        let title = Title::project(self.title.as_deref())?;
        let description = Description::project(self.description.as_deref())?;
        let status = match self.status.as_deref() {
            None | Some("") => ProjectStatus::default(),
            Some(raw) => raw.parse()?,
        };
        let tags = Tags::parse(self.tags)?;

        Ok(NewProject {
            title: title.into_inner(),
            description: description.into_inner(),
            status,
            tags: tags.into_inner(),
        })
    }
}

/// Repository for project documents.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project; the store assigns id and timestamps.
    async fn insert(&self, project: NewProject) -> Result<Project>;

    /// Fetch a project by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Project>>;

    /// List all projects, newest first.
    async fn list(&self) -> Result<Vec<Project>>;

    /// Set the status; returns the updated project, or None if missing.
    async fn update_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>>;

    /// Delete a project; returns the removed record, or None if missing.
    async fn delete(&self, id: Uuid) -> Result<Option<Project>>;

    /// Append a task id to `tasks`. Returns false if the project is missing.
    async fn push_task(&self, id: Uuid, task_id: Uuid) -> Result<bool>;

    /// Remove task ids from `tasks`. Returns false if the project is missing.
    async fn pull_tasks(&self, id: Uuid, task_ids: &[Uuid]) -> Result<bool>;

    /// Remove every project (seeding only).
    async fn delete_all(&self) -> Result<u64>;
}

// =============================================================================
// TASK REPOSITORY TRAITS
// =============================================================================

/// Request for creating a new task, as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskRequest {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    /// Owning task when creating a subtask.
    pub parent_task: Option<String>,
}

/// A validated task ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub parent_task: Option<Uuid>,
}

impl CreateTaskRequest {
    /// Apply defaults (`todo`) and check every field.
    pub fn validate(self) -> Result<NewTask> {
        let project_id = match self.project_id.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(crate::Error::InvalidInput(
                    "Project ID is required".to_string(),
                ))
            }
            Some(raw) => parse_id("project", raw)?,
        };
        let title = Title::task(self.title.as_deref())?;
        let description = Description::task(self.description.as_deref())?;
        let status = match self.status.as_deref() {
            None | Some("") => TaskStatus::default(),
            Some(raw) => raw.parse()?,
        };
        let parent_task = match self.parent_task.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_id("task", raw)?),
        };

        Ok(NewTask {
            project_id,
            title: title.into_inner(),
            description: description.into_inner(),
            status,
            parent_task,
        })
    }
}

/// Repository for task documents.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task with no subtasks or attachments.
    async fn insert(&self, task: NewTask) -> Result<Task>;

    /// Fetch a task by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Task>>;

    /// Fetch several tasks, in the order of `ids`; missing ids are skipped.
    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Task>>;

    /// Ids of every task whose `projectId` is `project_id`.
    async fn ids_for_project(&self, project_id: Uuid) -> Result<Vec<Uuid>>;

    /// Set the status; returns the updated task, or None if missing.
    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>>;

    /// Append an attachment; returns the updated task, or None if missing.
    async fn push_attachment(&self, id: Uuid, attachment: Attachment) -> Result<Option<Task>>;

    /// Append a subtask id. Returns false if the task is missing.
    async fn push_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool>;

    /// Remove a subtask id. Returns false if the task is missing.
    async fn pull_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool>;

    /// Delete the given tasks; returns how many existed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;

    /// Remove every task (seeding only).
    async fn delete_all(&self) -> Result<u64>;
}
