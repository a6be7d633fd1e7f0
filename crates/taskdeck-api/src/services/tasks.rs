//! Task operations, including the cascading subtask delete.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use taskdeck_core::{
    defaults, AttachmentInput, CreateTaskRequest, DeletedTasks, Error, EventBus,
    ProjectRepository, Result, ServerEvent, Task, TaskDetail, TaskRepository, TaskStatus,
};

use super::view_cache::{project_path, task_path, ViewCache, LISTING_PATH};
use super::{collect_subtrees, Cycles};

/// Creates, reads, updates and deletes tasks.
#[derive(Clone)]
pub struct TaskService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    views: ViewCache,
    events: Arc<EventBus>,
}

impl TaskService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        views: ViewCache,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            projects,
            tasks,
            views,
            events,
        }
    }

    /// Create a task under an existing project, optionally as a subtask.
    ///
    /// The parent, when given, must exist and belong to the same project.
    /// Insert, `project.tasks` append and `parent.subtasks` append are
    /// independent writes.
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task> {
        let new_task = request.validate()?;
        let project_id = new_task.project_id;

        if self.projects.fetch(project_id).await?.is_none() {
            return Err(Error::ProjectNotFound(project_id));
        }

        if let Some(parent_id) = new_task.parent_task {
            let parent = self
                .tasks
                .fetch(parent_id)
                .await?
                .ok_or(Error::TaskNotFound(parent_id))?;
            if parent.project_id != Some(project_id) {
                return Err(Error::Integrity(format!(
                    "Parent task {} belongs to a different project",
                    parent_id
                )));
            }
        }

        let task = self.tasks.insert(new_task).await?;
        if !self.projects.push_task(project_id, task.id).await? {
            warn!(
                subsystem = "services",
                project_id = %project_id,
                task_id = %task.id,
                "Project vanished before task could be listed"
            );
        }

        let mut paths = vec![LISTING_PATH.to_string(), project_path(project_id)];
        if let Some(parent_id) = task.parent_task {
            self.tasks.push_subtask(parent_id, task.id).await?;
            paths.push(task_path(parent_id));
        }

        info!(
            subsystem = "services",
            component = "tasks",
            op = "create",
            task_id = %task.id,
            project_id = %project_id,
            "Task created"
        );

        self.views.revalidate_all(paths).await;
        self.events.emit(ServerEvent::TaskCreated {
            task_id: task.id,
            project_id,
            parent_task: task.parent_task,
        });
        Ok(task)
    }

    /// A task with its project title and resolved subtasks.
    pub async fn detail(&self, id: Uuid) -> Result<TaskDetail> {
        let task = self
            .tasks
            .fetch(id)
            .await?
            .ok_or(Error::TaskNotFound(id))?;

        let project_title = match task.project_id {
            Some(project_id) => self
                .projects
                .fetch(project_id)
                .await?
                .map(|p| p.title),
            None => None,
        }
        .unwrap_or_else(|| defaults::UNKNOWN_PROJECT_TITLE.to_string());

        let subtasks = self.tasks.fetch_many(&task.subtasks).await?;
        Ok(TaskDetail {
            task,
            project_title,
            subtasks,
        })
    }

    /// The task detail view, served from the cache.
    pub async fn detail_view(&self, id: Uuid) -> Result<Value> {
        self.views
            .get_or_render(&task_path(id), || self.detail(id))
            .await
    }

    /// Parse `status` and apply it.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Task> {
        let status: TaskStatus = status.parse()?;
        let task = self
            .tasks
            .update_status(id, status)
            .await?
            .ok_or(Error::TaskNotFound(id))?;

        info!(
            subsystem = "services",
            component = "tasks",
            op = "update_status",
            task_id = %id,
            status = %status,
            "Task status updated"
        );

        self.views.revalidate_all(Self::views_showing(&task)).await;
        self.events.emit(ServerEvent::TaskStatusChanged {
            task_id: id,
            project_id: task.project_id,
            status,
        });
        Ok(task)
    }

    /// Validate attachment metadata and append it to the task.
    pub async fn add_attachment(&self, id: Uuid, input: AttachmentInput) -> Result<Task> {
        let attachment = input.validate()?;
        let name = attachment.name.clone();
        let task = self
            .tasks
            .push_attachment(id, attachment)
            .await?
            .ok_or(Error::TaskNotFound(id))?;

        info!(
            subsystem = "services",
            component = "tasks",
            op = "add_attachment",
            task_id = %id,
            result_count = task.attachments.len(),
            "Attachment added"
        );

        self.views.revalidate_all(Self::views_showing(&task)).await;
        self.events
            .emit(ServerEvent::TaskAttachmentAdded { task_id: id, name });
        Ok(task)
    }

    /// Delete a task and its whole subtask tree.
    ///
    /// The tree is collected first; a cycle in the stored references aborts
    /// the delete before anything is written. The root is detached from its
    /// parent and every deleted id is pulled from its project's task list.
    pub async fn delete(&self, id: Uuid) -> Result<DeletedTasks> {
        let start = Instant::now();
        let root = self
            .tasks
            .fetch(id)
            .await?
            .ok_or(Error::TaskNotFound(id))?;

        let tree = collect_subtrees(self.tasks.as_ref(), &[id], Cycles::Reject).await?;
        let deleted: Vec<Uuid> = tree.iter().map(|t| t.id).collect();

        if let Some(parent_id) = root.parent_task {
            if !self.tasks.pull_subtask(parent_id, id).await? {
                warn!(
                    subsystem = "services",
                    task_id = %id,
                    parent_task = %parent_id,
                    "Parent task missing while detaching subtask"
                );
            }
        }

        let mut by_project: BTreeMap<Uuid, Vec<Uuid>> = BTreeMap::new();
        for task in &tree {
            if let Some(project_id) = task.project_id {
                by_project.entry(project_id).or_default().push(task.id);
            }
        }
        for (project_id, ids) in &by_project {
            self.projects.pull_tasks(*project_id, ids).await?;
        }

        let removed = self.tasks.delete_many(&deleted).await?;

        info!(
            subsystem = "services",
            component = "tasks",
            op = "delete",
            task_id = %id,
            result_count = removed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Task tree deleted"
        );

        let mut paths = vec![LISTING_PATH.to_string()];
        paths.extend(by_project.keys().map(|p| project_path(*p)));
        paths.extend(deleted.iter().map(|t| task_path(*t)));
        paths.extend(root.parent_task.map(task_path));
        self.views.revalidate_all(paths).await;

        self.events.emit(ServerEvent::TaskDeleted {
            task_id: id,
            project_id: root.project_id,
            deleted: deleted.clone(),
        });
        Ok(DeletedTasks { deleted })
    }

    /// Cached views whose content includes `task`.
    fn views_showing(task: &Task) -> Vec<String> {
        let mut paths = vec![task_path(task.id)];
        paths.extend(task.project_id.map(project_path));
        paths.extend(task.parent_task.map(task_path));
        paths
    }
}
