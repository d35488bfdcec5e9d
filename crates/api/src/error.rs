//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::OrderId;
use domain::{ServiceError, ValidationError};
use thiserror::Error;

use crate::routes::orders::Links;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request from the client.
    BadRequest(String),
    /// No order under the requested ID.
    OrderNotFound(OrderId),
    /// Order service error.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::OrderNotFound(order_id) => {
                let body = serde_json::json!({
                    "error": "Order not found",
                    "_links": Links::order(&order_id),
                });
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
            ApiError::Service(err) => service_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Conflict(_) => {
            tracing::error!(error = %err, "order id collision");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        ServiceError::Unavailable(_) => {
            tracing::error!(error = %err, "order store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(order_id) => ApiError::OrderNotFound(order_id),
            other => ApiError::Service(other),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Service(ServiceError::Validation(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Failures while wiring the application at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),

    #[error("Metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_store::StoreError;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let id = OrderId::new("x");
        assert_eq!(
            status_of(ValidationError::NoProducts),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::NotFound(id.clone())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::Conflict(id)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServiceError::Unavailable(StoreError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_migration_failure_is_a_startup_error() {
        let err = StartupError::from(sqlx::migrate::MigrateError::VersionMissing(1));
        assert!(matches!(err, StartupError::Migration(_)));
        assert!(err.to_string().starts_with("Migration failed"));
    }
}
