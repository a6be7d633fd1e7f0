//! taskdeck-api library: router, handlers and services shared by the
//! server and seed binaries.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use taskdeck_core::{defaults, EventBus, ProjectRepository, TaskRepository};

pub use error::ApiError;
pub use middleware::GlobalRateLimiter;
pub use response::{ActionResponse, ApiResponse};
pub use services::{ProjectService, TaskService, ViewCache};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub tasks: TaskService,
    /// Event bus for SSE subscribers.
    pub events: Arc<EventBus>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
    /// Pool backing the repositories, when they are PostgreSQL-backed.
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Wire both services over the given repositories.
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        views: ViewCache,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            projects: ProjectService::new(
                projects.clone(),
                tasks.clone(),
                views.clone(),
                events.clone(),
            ),
            tasks: TaskService::new(projects, tasks, views, events.clone()),
            events,
            rate_limiter: None,
            pool: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

/// Routes only, no middleware.
pub fn routes() -> Router<AppState> {
    use handlers::{projects, tasks};

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/project",
            get(projects::list_projects)
                .post(projects::create_project)
                .delete(projects::delete_project),
        )
        .route("/api/project/:id", get(projects::get_project))
        .route(
            "/api/project/:id/status",
            patch(projects::update_project_status),
        )
        .route("/api/task", post(tasks::create_task))
        .route(
            "/api/task/:id",
            get(tasks::get_task).delete(tasks::delete_task),
        )
        .route("/api/task/:id/status", patch(tasks::update_task_status))
        .route("/api/task/:id/attachments", post(tasks::add_attachment))
        .route("/api/status-config", get(handlers::status_config))
        .route("/api/events", get(handlers::sse_events))
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
}

/// Full application: routes plus rate limiting, tracing, request ids,
/// CORS and the body size limit.
pub fn build_router(state: AppState, allowed_origins: Option<&str>) -> Router {
    let origins = middleware::parse_allowed_origins(allowed_origins);

    routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(
            middleware::MakeRequestUuidV7,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state)
}
