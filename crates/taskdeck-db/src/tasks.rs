//! Task repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use taskdeck_core::{
    new_v7, Attachment, Error, NewTask, Result, Task, TaskRepository, TaskStatus,
};

const TASK_COLUMNS: &str = "id, title, description, status, attachments, subtasks, \
                            parent_task, project_id, created_at, updated_at";

/// PostgreSQL implementation of TaskRepository.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: Pool<Postgres>,
}

impl PgTaskRepository {
    /// Create a new PgTaskRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_task_row(r: &PgRow) -> Result<Task> {
    let status: String = r.get("status");
    let Json(attachments): Json<Vec<Attachment>> = r.get("attachments");
    Ok(Task {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        status: status.parse::<TaskStatus>()?,
        attachments,
        subtasks: r.get("subtasks"),
        parent_task: r.get("parent_task"),
        project_id: r.get("project_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: NewTask) -> Result<Task> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO task (id, title, description, status, attachments, subtasks,
                               parent_task, project_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, '[]'::jsonb, '{{}}', $5, $6, $7, $7)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.parent_task)
        .bind(task.project_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_task_row(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM task WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(map_task_row).transpose()
    }

    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS}
             FROM task JOIN unnest($1::uuid[]) WITH ORDINALITY AS wanted(id, ord) USING (id)
             ORDER BY wanted.ord"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            db_table = "task",
            requested = ids.len(),
            result_count = rows.len(),
            "Fetched tasks by id"
        );
        rows.iter().map(map_task_row).collect()
    }

    async fn ids_for_project(&self, project_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM task WHERE project_id = $1 ORDER BY created_at")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("id")).collect())
    }

    async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "UPDATE task SET status = $1, updated_at = $2 WHERE id = $3
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_task_row).transpose()
    }

    async fn push_attachment(&self, id: Uuid, attachment: Attachment) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "UPDATE task SET attachments = attachments || $1::jsonb, updated_at = $2
             WHERE id = $3
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Json(vec![attachment]))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_task_row).transpose()
    }

    async fn push_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE task SET subtasks = array_append(subtasks, $1), updated_at = $2 WHERE id = $3",
        )
        .bind(subtask_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_subtask(&self, id: Uuid, subtask_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE task SET subtasks = array_remove(subtasks, $1), updated_at = $2 WHERE id = $3",
        )
        .bind(subtask_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM task WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM task")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
