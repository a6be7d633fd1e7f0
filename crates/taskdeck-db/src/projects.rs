//! Project repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use taskdeck_core::{new_v7, Error, NewProject, Project, ProjectRepository, ProjectStatus, Result};

const PROJECT_COLUMNS: &str = "id, title, description, status, tags, tasks, created_at, updated_at";

/// PostgreSQL implementation of ProjectRepository.
#[derive(Clone)]
pub struct PgProjectRepository {
    pool: Pool<Postgres>,
}

impl PgProjectRepository {
    /// Create a new PgProjectRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_project_row(r: &PgRow) -> Result<Project> {
    let status: String = r.get("status");
    Ok(Project {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        status: status.parse::<ProjectStatus>()?,
        tags: r.get("tags"),
        tasks: r.get("tasks"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn insert(&self, project: NewProject) -> Result<Project> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO project (id, title, description, status, tags, tasks, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, '{{}}', $6, $6)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(&project.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_project_row(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(map_project_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            db_table = "project",
            result_count = rows.len(),
            "Listed projects"
        );
        rows.iter().map(map_project_row).collect()
    }

    async fn update_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "UPDATE project SET status = $1, updated_at = $2 WHERE id = $3
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_project_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "DELETE FROM project WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_project_row).transpose()
    }

    async fn push_task(&self, id: Uuid, task_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE project SET tasks = array_append(tasks, $1), updated_at = $2 WHERE id = $3",
        )
        .bind(task_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_tasks(&self, id: Uuid, task_ids: &[Uuid]) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE project
             SET tasks = ARRAY(
                     SELECT t FROM unnest(tasks) WITH ORDINALITY AS u(t, n)
                     WHERE t <> ALL($1) ORDER BY n
                 ),
                 updated_at = $2
             WHERE id = $3",
        )
        .bind(task_ids)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM project")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
