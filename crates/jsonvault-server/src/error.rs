//! Server-wide error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Closed error taxonomy shared by every resource slice.
///
/// Storage and publisher adapters return this type directly, so the
/// service layer matches on kind instead of downcasting. Infrastructure
/// causes stay wrapped; the only downgrades are the two explicit
/// mappings performed by the adapters and services themselves
/// (unique-constraint violation to `AlreadyExists`, zero rows affected
/// to `NotFound`).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or incomplete request data. Always a caller fault.
    #[error("{0}")]
    Validation(String),

    /// A live row already holds the same uniqueness key.
    #[error("a record with this unique key already exists")]
    AlreadyExists,

    /// The requested row does not exist.
    #[error("record not found")]
    NotFound,

    /// The storage engine failed while executing a query.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The event sink rejected or never acknowledged a publish.
    #[error("event publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Faults raised while emitting a change event.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("append to stream: {0}")]
    Stream(#[from] redis::RedisError),
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::Publish(PublishError::Stream(err))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ServiceError::AlreadyExists => (StatusCode::CONFLICT, "CONFLICT"),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            },
            ServiceError::Publish(ref e) => {
                tracing::error!("Publish error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "PUBLISH_ERROR")
            },
        };

        // The 5xx body carries the error text; this service sits behind a
        // trusted boundary and the detail is worth more than the redaction.
        let body = Json(ErrorResponse::new(code, self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let response = ServiceError::Validation("id is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn already_exists_maps_to_409() {
        let response = ServiceError::AlreadyExists.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ServiceError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_maps_to_500() {
        let response = ServiceError::Storage(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn publish_maps_to_500() {
        let err = redis::RedisError::from((redis::ErrorKind::IoError, "connection reset"));
        let response = ServiceError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
