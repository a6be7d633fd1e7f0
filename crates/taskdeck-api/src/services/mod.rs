//! Service layer for business logic.
//!
//! Services own the cross-collection bookkeeping the store does not do:
//! keeping `project.tasks` and `task.subtasks` in step with the tasks that
//! exist, cascading deletes, and revalidating cached views after writes.

pub mod projects;
pub mod tasks;
pub mod view_cache;

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use taskdeck_core::{Error, Result, Task, TaskRepository};

pub use projects::ProjectService;
pub use tasks::TaskService;
pub use view_cache::{CacheStats, ViewCache};

/// What a subtree walk does when `subtasks` leads back to a task on the
/// current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cycles {
    /// Fail with `Integrity` before anything is written.
    Reject,
    /// Stop descending; every task on the cycle is already collected.
    Tolerate,
}

enum Step {
    Enter(Uuid),
    Leave(Uuid),
}

/// Collect `roots` and every task reachable through `subtasks`, in
/// depth-first preorder.
///
/// Each task is collected once even when several parents or roots list
/// it. Dangling ids are skipped with a warning. Nothing is written.
pub(crate) async fn collect_subtrees(
    tasks: &dyn TaskRepository,
    roots: &[Uuid],
    cycles: Cycles,
) -> Result<Vec<Task>> {
    let mut visited = HashSet::new();
    let mut on_path = HashSet::new();
    let mut collected = Vec::new();
    let mut stack: Vec<Step> = roots.iter().rev().map(|id| Step::Enter(*id)).collect();

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Leave(id) => {
                on_path.remove(&id);
                continue;
            }
            Step::Enter(id) => id,
        };

        if on_path.contains(&id) {
            match cycles {
                Cycles::Reject => {
                    return Err(Error::Integrity(format!(
                        "Subtask references form a cycle at task {}",
                        id
                    )))
                }
                Cycles::Tolerate => continue,
            }
        }
        if !visited.insert(id) {
            continue;
        }

        let Some(task) = tasks.fetch(id).await? else {
            warn!(
                subsystem = "services",
                task_id = %id,
                "Skipping dangling subtask reference"
            );
            continue;
        };

        on_path.insert(id);
        stack.push(Step::Leave(id));
        stack.extend(task.subtasks.iter().rev().map(|child| Step::Enter(*child)));
        collected.push(task);
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskdeck_core::TaskStatus;
    use taskdeck_db::InMemoryStore;

    fn task(id: Uuid, subtasks: Vec<Uuid>) -> Task {
        Task {
            id,
            title: id.to_string(),
            description: None,
            status: TaskStatus::Todo,
            attachments: vec![],
            subtasks,
            parent_task: None,
            project_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_preorder_walk() {
        let store = InMemoryStore::new();
        let [root, a, b, a1] = [(); 4].map(|_| Uuid::now_v7());
        store.put_task(task(root, vec![a, b])).await;
        store.put_task(task(a, vec![a1])).await;
        store.put_task(task(b, vec![])).await;
        store.put_task(task(a1, vec![])).await;

        let ids: Vec<Uuid> = collect_subtrees(&store, &[root], Cycles::Reject)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![root, a, a1, b]);
    }

    #[tokio::test]
    async fn test_cycle_rejected() {
        let store = InMemoryStore::new();
        let [a, b] = [(); 2].map(|_| Uuid::now_v7());
        store.put_task(task(a, vec![b])).await;
        store.put_task(task(b, vec![a])).await;

        let err = collect_subtrees(&store, &[a], Cycles::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[tokio::test]
    async fn test_shared_descendants_skipped() {
        let store = InMemoryStore::new();
        let [a, b, shared] = [(); 3].map(|_| Uuid::now_v7());
        store.put_task(task(a, vec![shared])).await;
        store.put_task(task(b, vec![shared])).await;
        store.put_task(task(shared, vec![])).await;

        let collected = collect_subtrees(&store, &[a, b, shared], Cycles::Tolerate)
            .await
            .unwrap();
        assert_eq!(collected.len(), 3);
    }

    #[tokio::test]
    async fn test_self_reference_rejected() {
        let store = InMemoryStore::new();
        let a = Uuid::now_v7();
        store.put_task(task(a, vec![a])).await;

        let err = collect_subtrees(&store, &[a], Cycles::Reject)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[tokio::test]
    async fn test_diamond_is_not_a_cycle() {
        let store = InMemoryStore::new();
        let [root, left, right, shared] = [(); 4].map(|_| Uuid::now_v7());
        store.put_task(task(root, vec![left, right])).await;
        store.put_task(task(left, vec![shared])).await;
        store.put_task(task(right, vec![shared])).await;
        store.put_task(task(shared, vec![])).await;

        let ids: Vec<Uuid> = collect_subtrees(&store, &[root], Cycles::Reject)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![root, left, shared, right]);
    }

    #[tokio::test]
    async fn test_duplicate_subtask_id_collected_once() {
        let store = InMemoryStore::new();
        let [root, child] = [(); 2].map(|_| Uuid::now_v7());
        store.put_task(task(root, vec![child, child])).await;
        store.put_task(task(child, vec![])).await;

        let collected = collect_subtrees(&store, &[root], Cycles::Reject)
            .await
            .unwrap();
        assert_eq!(collected.len(), 2);
    }

    #[tokio::test]
    async fn test_tolerated_cycle_collects_each_task_once() {
        let store = InMemoryStore::new();
        let [a, b] = [(); 2].map(|_| Uuid::now_v7());
        store.put_task(task(a, vec![b])).await;
        store.put_task(task(b, vec![a])).await;

        let collected = collect_subtrees(&store, &[a], Cycles::Tolerate)
            .await
            .unwrap();
        assert_eq!(collected.len(), 2);
    }

    #[tokio::test]
    async fn test_dangling_reference_skipped() {
        let store = InMemoryStore::new();
        let [root, ghost] = [(); 2].map(|_| Uuid::now_v7());
        store.put_task(task(root, vec![ghost])).await;

        let collected = collect_subtrees(&store, &[root], Cycles::Reject)
            .await
            .unwrap();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].id, root);
    }
}
