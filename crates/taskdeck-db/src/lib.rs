//! # taskdeck-db
//!
//! PostgreSQL database layer for taskdeck.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for projects and tasks
//! - An in-memory store implementing the same traits, for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskdeck_db::{CreateProjectRequest, Database, PoolConfig, ProjectRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/taskdeck", &PoolConfig::default()).await?;
//!     db.migrate().await?;
//!
//!     let project = db.projects.insert(CreateProjectRequest {
//!         title: Some("Website relaunch".to_string()),
//!         ..Default::default()
//!     }.validate()?).await?;
//!
//!     println!("Created project: {}", project.id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod pool;
pub mod projects;
pub mod tasks;
#[cfg(feature = "migrations")]
pub mod test_fixtures;

pub use memory::InMemoryStore;
pub use pool::{connect_pool, log_pool_metrics, PoolConfig};
pub use projects::PgProjectRepository;
pub use tasks::PgTaskRepository;

// Re-export core types used by callers of the repositories
pub use taskdeck_core::{
    CreateProjectRequest, CreateTaskRequest, Error, NewProject, NewTask, ProjectRepository,
    Result, TaskRepository,
};

/// Database handle bundling the pool and both repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Project repository.
    pub projects: PgProjectRepository,
    /// Task repository.
    pub tasks: PgTaskRepository,
}

impl Database {
    /// Create a new database instance from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            projects: PgProjectRepository::new(pool.clone()),
            tasks: PgTaskRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open the pool and build both repositories over it.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Close every pooled connection; waits for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
