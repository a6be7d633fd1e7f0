//! In-memory store for tests and database-less development.
//!
//! Implements both [`ProjectRepository`] and [`TaskRepository`] over a pair of
//! maps. Semantics follow the PostgreSQL repositories: references are never
//! checked, `list` is newest first, `fetch_many` keeps the requested order.
//!
//! ```rust
//! use std::sync::Arc;
//! use taskdeck_db::memory::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let projects: Arc<dyn taskdeck_core::ProjectRepository> = store.clone();
//! let tasks: Arc<dyn taskdeck_core::TaskRepository> = store;
//! # let _ = (projects, tasks);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskdeck_core::{
    new_v7, Attachment, NewProject, NewTask, Project, ProjectRepository, ProjectStatus, Result,
    Task, TaskRepository, TaskStatus,
};

/// Map-backed store shared by both repository traits.
#[derive(Default)]
pub struct InMemoryStore {
    projects: RwLock<HashMap<Uuid, Project>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub async fn project_count(&self) -> usize {
        self.projects.read().await.len()
    }

    /// Number of stored tasks.
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Store a task exactly as given, bypassing every service check.
    ///
    /// Lets tests build states the services never produce, such as
    /// subtask cycles or dangling references.
    pub async fn put_task(&self, task: Task) {
        self.tasks.write().await.insert(task.id, task);
    }

    /// Store a project exactly as given.
    pub async fn put_project(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert(&self, project: NewProject) -> Result<Project> {
        let now = Utc::now();
        let record = Project {
            id: new_v7(),
            title: project.title,
            description: project.description,
            status: project.status,
            tags: project.tags,
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.projects
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self.projects.read().await.values().cloned().collect();
        projects.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(projects)
    }

    async fn update_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>> {
        let mut projects = self.projects.write().await;
        Ok(projects.get_mut(&id).map(|project| {
            project.status = status;
            project.updated_at = Utc::now();
            project.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.projects.write().await.remove(&id))
    }

    async fn push_task(&self, id: Uuid, task_id: Uuid) -> Result<bool> {
        let mut projects = self.projects.write().await;
        Ok(match projects.get_mut(&id) {
            Some(project) => {
                project.tasks.push(task_id);
                project.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn pull_tasks(&self, id: Uuid, task_ids: &[Uuid]) -> Result<bool> {
        let mut projects = self.projects.write().await;
        Ok(match projects.get_mut(&id) {
            Some(project) => {
                project.tasks.retain(|t| !task_ids.contains(t));
                project.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut projects = self.projects.write().await;
        let count = projects.len() as u64;
        projects.clear();
        Ok(count)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let now = Utc::now();
        let record = Task {
            id: new_v7(),
            title: task.title,
            description: task.description,
            status: task.status,
            attachments: Vec::new(),
            subtasks: Vec::new(),
            parent_task: task.parent_task,
            project_id: Some(task.project_id),
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(ids.iter().filter_map(|id| tasks.get(id).cloned()).collect())
    }

    async fn ids_for_project(&self, project_id: Uuid) -> Result<Vec<Uuid>> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<&Task> = tasks
            .values()
            .filter(|t| t.project_id == Some(project_id))
            .collect();
        owned.sort_by_key(|t| (t.created_at, t.id));
        Ok(owned.into_iter().map(|t| t.id).collect())
    }

    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).map(|task| {
            task.status = status;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn push_attachment(&self, id: Uuid, attachment: Attachment) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).map(|task| {
            task.attachments.push(attachment);
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn push_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(match tasks.get_mut(&id) {
            Some(task) => {
                task.subtasks.push(subtask_id);
                task.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn pull_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(match tasks.get_mut(&id) {
            Some(task) => {
                task.subtasks.retain(|s| *s != subtask_id);
                task.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let mut tasks = self.tasks.write().await;
        Ok(ids.iter().filter(|id| tasks.remove(id).is_some()).count() as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut tasks = self.tasks.write().await;
        let count = tasks.len() as u64;
        tasks.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: None,
            status: ProjectStatus::Planning,
            tags: vec![],
        }
    }

    fn new_task(project_id: Uuid, title: &str) -> NewTask {
        NewTask {
            project_id,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            parent_task: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryStore::new();
        let first = ProjectRepository::insert(&store, new_project("first")).await.unwrap();
        let second = ProjectRepository::insert(&store, new_project("second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_push_and_pull_tasks() {
        let store = InMemoryStore::new();
        let project = ProjectRepository::insert(&store, new_project("p")).await.unwrap();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        assert!(store.push_task(project.id, a).await.unwrap());
        assert!(store.push_task(project.id, b).await.unwrap());
        assert!(store.pull_tasks(project.id, &[a]).await.unwrap());

        let fetched = ProjectRepository::fetch(&store, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.tasks, vec![b]);
        assert!(!store.push_task(Uuid::now_v7(), a).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_many_keeps_order_and_skips_missing() {
        let store = InMemoryStore::new();
        let project_id = Uuid::now_v7();
        let a = TaskRepository::insert(&store, new_task(project_id, "a")).await.unwrap();
        let b = TaskRepository::insert(&store, new_task(project_id, "b")).await.unwrap();

        let fetched = store
            .fetch_many(&[b.id, Uuid::now_v7(), a.id])
            .await
            .unwrap();
        let titles: Vec<_> = fetched.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_ids_for_project() {
        let store = InMemoryStore::new();
        let mine = Uuid::now_v7();
        let other = Uuid::now_v7();
        let a = TaskRepository::insert(&store, new_task(mine, "a")).await.unwrap();
        TaskRepository::insert(&store, new_task(other, "b")).await.unwrap();

        assert_eq!(store.ids_for_project(mine).await.unwrap(), vec![a.id]);
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing() {
        let store = InMemoryStore::new();
        let a = TaskRepository::insert(&store, new_task(Uuid::now_v7(), "a")).await.unwrap();

        let removed = store.delete_many(&[a.id, Uuid::now_v7()]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_status_missing_returns_none() {
        let store = InMemoryStore::new();
        let updated = TaskRepository::update_status(&store, Uuid::now_v7(), TaskStatus::Review)
            .await
            .unwrap();
        assert!(updated.is_none());
    }
}
