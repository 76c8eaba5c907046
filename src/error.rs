/// Unified error types for the AnonyChat moderation subsystem
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the moderation store, admin gateway and monitor
#[derive(Error, Debug)]
pub enum ModError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Admin key missing or wrong
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Validation errors (bad input, closed-set violations)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport errors talking to the admin gateway
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Admin gateway answered with a non-success status
    #[error("Gateway rejected request with status {0}")]
    GatewayRejected(u16),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// JSON error body returned by the gateway
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ModError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ModError::Authorization(_) => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                self.to_string(),
            ),
            ModError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            ModError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            ModError::Database(_)
            | ModError::Migration(_)
            | ModError::Internal(_)
            | ModError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
            _ => (
                StatusCode::BAD_GATEWAY,
                "UpstreamError",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for moderation operations
pub type ModResult<T> = Result<T, ModError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_maps_to_forbidden() {
        let response = ModError::Authorization("bad key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_database_errors_do_not_leak() {
        let response = ModError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = ModError::Validation("blank ip".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
