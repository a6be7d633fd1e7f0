//! Structured logging field name constants for taskdeck.
//!
//! All crates use these names so log queries work the same across the
//! api, service and database layers.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Store failure surfaced as a 500 |
//! | WARN  | Recoverable issue (dangling reference skipped, rate limit hit) |
//! | INFO  | Lifecycle events and completed writes |
//! | DEBUG | Cache hits/misses, decision points |
//! | TRACE | Per-node iteration during tree walks |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "services", "database", "view_cache", "events"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Values: "projects", "tasks", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "delete", "update_status", "add_attachment", "connect"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Project UUID being operated on.
pub const PROJECT_ID: &str = "project_id";

/// Task UUID being operated on.
pub const TASK_ID: &str = "task_id";

/// View path being cached or invalidated.
pub const VIEW_PATH: &str = "path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or affected.
pub const RESULT_COUNT: &str = "result_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
