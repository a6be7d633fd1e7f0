//! Centralized default constants for taskdeck.
//!
//! Field bounds, server settings and cache sizing live here so the api,
//! db and seed code never disagree on a limit.

// =============================================================================
// PROJECT FIELDS
// =============================================================================

/// Maximum characters in a project title.
pub const PROJECT_TITLE_MAX: usize = 100;

/// Maximum characters in a project description.
pub const PROJECT_DESCRIPTION_MAX: usize = 500;

// =============================================================================
// TASK FIELDS
// =============================================================================

/// Maximum characters in a task title.
pub const TASK_TITLE_MAX: usize = 200;

/// Maximum characters in a task description.
pub const TASK_DESCRIPTION_MAX: usize = 1000;

/// Fallback title shown when a task's project no longer exists.
pub const UNKNOWN_PROJECT_TITLE: &str = "Unknown Project";

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default rate limit: max requests per period.
pub const RATE_LIMIT_REQUESTS: u64 = 100;

/// Default rate limit: period in seconds.
pub const RATE_LIMIT_PERIOD_SECS: u64 = 60;

/// Maximum accepted request body (JSON only, attachments are metadata).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// DATABASE POOL
// =============================================================================

/// Upper bound on pooled connections (`DATABASE_MAX_CONNECTIONS`).
pub const POOL_MAX_CONNECTIONS: u32 = 10;

pub const POOL_MIN_CONNECTIONS: u32 = 1;

/// Seconds to wait for a free connection before failing the request.
pub const POOL_ACQUIRE_TIMEOUT_SECS: u64 = 30;

pub const POOL_IDLE_TIMEOUT_SECS: u64 = 600;

/// Connections are recycled after 30 minutes.
pub const POOL_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// VIEW CACHE / EVENTS
// =============================================================================

/// Number of rendered views held by the view cache.
pub const VIEW_CACHE_CAPACITY: usize = 256;

/// Broadcast buffer for the event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// SSE keep-alive interval in seconds.
pub const SSE_KEEPALIVE_SECS: u64 = 15;
