//! Project operations.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use taskdeck_core::{
    CreateProjectRequest, Error, EventBus, Project, ProjectDetail, ProjectRepository,
    ProjectStatus, Result, ServerEvent, TaskRepository,
};

use super::view_cache::{project_path, task_path, ViewCache, LISTING_PATH};
use super::{collect_subtrees, Cycles};

/// Creates, reads, updates and deletes projects.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    views: ViewCache,
    events: Arc<EventBus>,
}

impl ProjectService {
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

    /// Validate and insert a project, then revalidate the listing.
    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project> {
        let new_project = request.validate()?;
        let project = self.projects.insert(new_project).await?;

        info!(
            subsystem = "services",
            component = "projects",
            op = "create",
            project_id = %project.id,
            "Project created"
        );

        self.views.revalidate(LISTING_PATH).await;
        self.events.emit(ServerEvent::ProjectCreated {
            project_id: project.id,
            title: project.title.clone(),
        });
        Ok(project)
    }

    /// All projects, newest first.
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.projects.list().await
    }

    /// The listing view, served from the cache.
    pub async fn list_view(&self) -> Result<Value> {
        self.views
            .get_or_render(LISTING_PATH, || self.list())
            .await
    }

    /// A project with its tasks, in `project.tasks` order.
    pub async fn detail(&self, id: Uuid) -> Result<ProjectDetail> {
        let project = self
            .projects
            .fetch(id)
            .await?
            .ok_or(Error::ProjectNotFound(id))?;
        let tasks = self.tasks.fetch_many(&project.tasks).await?;
        Ok(ProjectDetail { project, tasks })
    }

    /// The project detail view, served from the cache.
    pub async fn detail_view(&self, id: Uuid) -> Result<Value> {
        self.views
            .get_or_render(&project_path(id), || self.detail(id))
            .await
    }

    /// Parse `status` and apply it.
    ///
    /// The value is checked before anything is written.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Project> {
        let status: ProjectStatus = status.parse()?;
        let project = self
            .projects
            .update_status(id, status)
            .await?
            .ok_or(Error::ProjectNotFound(id))?;

        info!(
            subsystem = "services",
            component = "projects",
            op = "update_status",
            project_id = %id,
            status = %status,
            "Project status updated"
        );

        self.views
            .revalidate_all([project_path(id), LISTING_PATH.to_string()])
            .await;
        self.events
            .emit(ServerEvent::ProjectStatusChanged { project_id: id, status });
        Ok(project)
    }

    /// Delete a project together with every task it owns.
    ///
    /// Owned tasks are those whose `projectId` points here, whether or not
    /// `project.tasks` lists them, each with its subtask tree. A listed task
    /// that belongs to another project is left alone.
    pub async fn delete(&self, id: Uuid) -> Result<Project> {
        let start = Instant::now();
        let project = self
            .projects
            .fetch(id)
            .await?
            .ok_or(Error::ProjectNotFound(id))?;

        // Tasks listed here but owned by another project stay where they are.
        let mut roots = Vec::new();
        for task in self.tasks.fetch_many(&project.tasks).await? {
            match task.project_id {
                Some(owner) if owner != id => warn!(
                    subsystem = "services",
                    project_id = %id,
                    task_id = %task.id,
                    owner = %owner,
                    "Keeping task listed under deleted project but owned elsewhere"
                ),
                _ => roots.push(task.id),
            }
        }
        let listed: HashSet<Uuid> = roots.iter().copied().collect();
        roots.extend(
            self.tasks
                .ids_for_project(id)
                .await?
                .into_iter()
                .filter(|t| !listed.contains(t)),
        );

        let owned = collect_subtrees(self.tasks.as_ref(), &roots, Cycles::Tolerate).await?;
        let owned_ids: Vec<Uuid> = owned.iter().map(|t| t.id).collect();
        let owned_set: HashSet<Uuid> = owned_ids.iter().copied().collect();

        // Detach from anything outside the deleted set.
        for task in &owned {
            if let Some(parent) = task.parent_task.filter(|p| !owned_set.contains(p)) {
                self.tasks.pull_subtask(parent, task.id).await?;
            }
        }
        let foreign_projects: BTreeSet<Uuid> = owned
            .iter()
            .filter_map(|t| t.project_id)
            .filter(|p| *p != id)
            .collect();
        for other in &foreign_projects {
            warn!(
                subsystem = "services",
                project_id = %other,
                "Deleted project owned tasks listed under another project"
            );
            self.projects.pull_tasks(*other, &owned_ids).await?;
        }

        self.tasks.delete_many(&owned_ids).await?;
        let deleted = self
            .projects
            .delete(id)
            .await?
            .ok_or(Error::ProjectNotFound(id))?;

        info!(
            subsystem = "services",
            component = "projects",
            op = "delete",
            project_id = %id,
            result_count = owned_ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Project deleted"
        );

        let mut paths = vec![LISTING_PATH.to_string(), project_path(id)];
        paths.extend(foreign_projects.iter().map(|p| project_path(*p)));
        paths.extend(owned.iter().filter_map(|t| t.parent_task).map(task_path));
        paths.extend(owned_ids.iter().map(|t| task_path(*t)));
        self.views.revalidate_all(paths).await;

        self.events.emit(ServerEvent::ProjectDeleted {
            project_id: id,
            task_count: owned_ids.len(),
        });
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::NewTask;
    use taskdeck_db::InMemoryStore;

    fn service(store: Arc<InMemoryStore>) -> ProjectService {
        let events = Arc::new(EventBus::new(64));
        ProjectService::new(
            store.clone(),
            store,
            ViewCache::new(16, events.clone()),
            events,
        )
    }

    fn request(title: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store);

        let project = service.create(request("Roadmap")).await.unwrap();
        assert_eq!(project.status, ProjectStatus::Planning);
        assert!(project.tags.is_empty());
        assert!(project.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value_without_write() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());
        let project = service.create(request("Roadmap")).await.unwrap();

        let err = service
            .update_status(project.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(_)));

        let stored = ProjectRepository::fetch(store.as_ref(), project.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ProjectStatus::Planning);
        assert_eq!(stored.updated_at, project.updated_at);
    }

    #[tokio::test]
    async fn test_update_status_unknown_project() {
        let service = service(Arc::new(InMemoryStore::new()));
        let err = service
            .update_status(Uuid::now_v7(), "review")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_unlisted_tasks() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());
        let project = service.create(request("Roadmap")).await.unwrap();

        // A task that points at the project but is missing from project.tasks.
        TaskRepository::insert(
            store.as_ref(),
            NewTask {
                project_id: project.id,
                title: "orphan".into(),
                description: None,
                status: Default::default(),
                parent_task: None,
            },
        )
        .await
        .unwrap();

        service.delete(project.id).await.unwrap();
        assert_eq!(store.task_count().await, 0);
        assert_eq!(store.project_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_keeps_listed_task_owned_elsewhere() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());
        let doomed = service.create(request("Doomed")).await.unwrap();
        let other = service.create(request("Other")).await.unwrap();

        let foreign = TaskRepository::insert(
            store.as_ref(),
            NewTask {
                project_id: other.id,
                title: "foreign".into(),
                description: None,
                status: Default::default(),
                parent_task: None,
            },
        )
        .await
        .unwrap();
        store.push_task(other.id, foreign.id).await.unwrap();
        // Inconsistent: also listed under the project being deleted.
        store.push_task(doomed.id, foreign.id).await.unwrap();

        service.delete(doomed.id).await.unwrap();

        assert!(TaskRepository::fetch(store.as_ref(), foreign.id)
            .await
            .unwrap()
            .is_some());
        let kept = ProjectRepository::fetch(store.as_ref(), other.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.tasks, vec![foreign.id]);
    }

    #[tokio::test]
    async fn test_delete_unknown_project() {
        let service = service(Arc::new(InMemoryStore::new()));
        let err = service.delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }
}
