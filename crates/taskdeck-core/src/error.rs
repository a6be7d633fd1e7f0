//! Error types for taskdeck.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using taskdeck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taskdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Project not found
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Task not found
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    /// Invalid input (missing field, length bound, empty tag)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Value outside a closed status enumeration
    #[error("{0} is not a valid status")]
    InvalidStatus(String),

    /// Identifier that does not parse as a UUID
    #[error("Invalid {kind} ID format: {value}")]
    InvalidId { kind: &'static str, value: String },

    /// Stored references violate a structural invariant (cycles, cross-project links)
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors whose message is safe to show to the caller.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::ProjectNotFound(_)
                | Error::TaskNotFound(_)
                | Error::InvalidInput(_)
                | Error::InvalidStatus(_)
                | Error::InvalidId { .. }
                | Error::Integrity(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_project_not_found() {
        let id = Uuid::nil();
        let err = Error::ProjectNotFound(id);
        assert_eq!(err.to_string(), format!("Project not found: {}", id));
    }

    #[test]
    fn test_error_display_task_not_found() {
        let id = Uuid::new_v4();
        let err = Error::TaskNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_invalid_status() {
        let err = Error::InvalidStatus("archived".to_string());
        assert_eq!(err.to_string(), "archived is not a valid status");
    }

    #[test]
    fn test_error_display_invalid_id() {
        let err = Error::InvalidId {
            kind: "project",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid project ID format: abc");
    }

    #[test]
    fn test_error_display_integrity() {
        let err = Error::Integrity("cycle".to_string());
        assert_eq!(err.to_string(), "Integrity error: cycle");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::InvalidInput("x".into()).is_client_error());
        assert!(Error::TaskNotFound(Uuid::nil()).is_client_error());
        assert!(!Error::Internal("x".into()).is_client_error());
        assert!(!Error::Config("x".into()).is_client_error());
        assert!(!Error::Database(sqlx::Error::PoolTimedOut).is_client_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
