use std::time::Duration;

use thiserror::Error;

/// Reasons a message was not accepted by the bus.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The event or envelope could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The bus rejected the message or could not be reached.
    #[error("Bus error: {0}")]
    Bus(String),

    /// The bus did not acknowledge the message in time.
    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),

    /// The encoded message is larger than the bus accepts.
    #[error("Payload of {size} bytes exceeds the bus limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

impl From<sqlx::Error> for NotifierError {
    fn from(err: sqlx::Error) -> Self {
        NotifierError::Bus(err.to_string())
    }
}

/// Result type for notifier operations.
pub type Result<T> = std::result::Result<T, NotifierError>;
