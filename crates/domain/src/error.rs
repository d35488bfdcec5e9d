//! Service error types.

use common::OrderId;
use order_store::StoreError;
use thiserror::Error;

use crate::order::ValidationError;

/// Errors returned at the order service boundary.
///
/// A lost notification is not an error; see [`crate::NotificationStatus`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The creation request was malformed. Nothing was written.
    #[error("Invalid order request: {0}")]
    Validation(#[from] ValidationError),

    /// The generated order ID was already taken. Nothing was published.
    #[error("Order {0} already exists")]
    Conflict(OrderId),

    /// The order store failed. Nothing was published.
    #[error("Order store unavailable: {0}")]
    Unavailable(StoreError),

    /// No order exists for the requested ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(id) => ServiceError::Conflict(id),
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Unavailable(other),
        }
    }
}
