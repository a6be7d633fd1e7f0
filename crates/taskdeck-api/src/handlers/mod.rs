//! HTTP handlers for taskdeck-api.

pub mod projects;
pub mod tasks;

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    Json,
};
use futures::Stream;
use utoipa::OpenApi;

use taskdeck_core::{defaults, EventEnvelope, StatusConfig};

use crate::openapi::ApiDoc;
use crate::response::ApiResponse;
use crate::AppState;

// =============================================================================
// HEALTH CHECK
// =============================================================================

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Health check database ping failed");
                "unavailable"
            }
        },
        None => "in-memory",
    };

    Json(serde_json::json!({
        "status": if database == "unavailable" { "degraded" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}

/// Label/variant/color tables for both status enums.
pub async fn status_config() -> ApiResponse<StatusConfig> {
    ApiResponse::ok(StatusConfig::build())
}

/// OpenAPI document for the wire models.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// =============================================================================
// SERVER-SENT EVENTS
// =============================================================================

/// SSE event stream handler.
///
/// Clients connect to `/api/events` and receive every envelope emitted on
/// the bus, including `view.revalidated` for cache-backed pages.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    use tokio_stream::StreamExt as _;
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(
        |result: Result<EventEnvelope, _>| match result {
            Ok(envelope) => match serde_json::to_string(&envelope) {
                Ok(json) => Some(Ok(Event::default()
                    .event(envelope.event_type.clone())
                    .id(envelope.event_id.to_string())
                    .data(json))),
                Err(_) => None,
            },
            Err(_) => None, // Skip lagged/closed errors
        },
    );

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(defaults::SSE_KEEPALIVE_SECS))
            .text("keepalive"),
    )
}
