//! HTTP error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers, rendered as `{success: false, error, details?}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// A create request failed field validation.
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// Store or server failure; the detail is logged, never returned.
    Internal(taskdeck_core::Error),
}

impl ApiError {
    /// Build the validation variant from a core error, keeping only its message.
    pub fn validation(err: taskdeck_core::Error) -> Self {
        match err {
            taskdeck_core::Error::InvalidInput(msg) => ApiError::Validation(msg),
            taskdeck_core::Error::InvalidStatus(_) => ApiError::Validation(err.to_string()),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                msg.clone()
            }
            ApiError::Validation(_) => "Validation failed".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<taskdeck_core::Error> for ApiError {
    fn from(err: taskdeck_core::Error) -> Self {
        use taskdeck_core::Error;

        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::InvalidStatus(_) => ApiError::BadRequest(err.to_string()),
            Error::InvalidId { kind, .. } => {
                ApiError::BadRequest(format!("Invalid {} ID format", kind))
            }
            Error::ProjectNotFound(_) => ApiError::NotFound("Project not found".to_string()),
            Error::TaskNotFound(_) => ApiError::NotFound("Task not found".to_string()),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Integrity(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(details) => json!({
                "success": false,
                "error": self.public_message(),
                "details": details,
            }),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                json!({ "success": false, "error": self.public_message() })
            }
            _ => json!({ "success": false, "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::Error;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidStatus("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::InvalidId {
                    kind: "project",
                    value: "x".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::ProjectNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::TaskNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::Integrity("cycle".into()), StatusCode::CONFLICT),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ApiError::from(Error::Internal("connection string leaked".into()));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_invalid_id_message() {
        let err = ApiError::from(Error::InvalidId {
            kind: "project",
            value: "abc".into(),
        });
        assert_eq!(err.public_message(), "Invalid project ID format");
    }

    #[test]
    fn test_validation_keeps_details() {
        let err = ApiError::validation(Error::InvalidInput(
            "Title must be at most 100 characters".into(),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Validation failed");
        assert!(
            matches!(err, ApiError::Validation(ref d) if d == "Title must be at most 100 characters")
        );
    }
}
