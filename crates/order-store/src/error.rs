use thiserror::Error;

use crate::OrderId;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional insert failed: a record with this key already exists.
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// No record exists for the requested key.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The backing store could not be reached or returned an error.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded back into an order.
    #[error("Invalid record for order {order_id}: {reason}")]
    InvalidRecord { order_id: String, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
