use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single outbound lookup call.
///
/// Never retried by the client; the orchestrator absorbs every variant into
/// the attribute's default value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    /// The request URL could not be built from the base URL and name.
    #[error("invalid lookup request: {0}")]
    Request(String),
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote service answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// The response body did not match the expected shape.
    #[error("decoding response: {0}")]
    Decode(String),
}

/// Application-specific error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database-related errors.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    /// Resource not found error.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Bad request error (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Error with context chain for better debugging.
    #[error("{context}: {source}")]
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::WithContext { source, context } => {
                // Log full context chain, respond as the underlying error
                tracing::error!("Error with context: {} -> {}", context, source);
                source.status_and_message()
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a JSON body.
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::UnexpectedStatus {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 429: rate limited");
    }

    #[test]
    fn test_context_keeps_underlying_status() {
        let result: Result<(), AppError> = Err(AppError::NotFound("human not found".into()));
        let err = result.context("deleting human 7").unwrap_err();
        assert_eq!(err.to_string(), "deleting human 7: Not found: human not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let response = AppError::BadRequest("name and surname required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
