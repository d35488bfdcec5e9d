//! Order creation and retrieval.

mod commands;
mod outcome;
mod service;
mod state;

pub use commands::CreateOrder;
pub use outcome::{NotificationStatus, OrderCreated};
pub use service::OrderService;
pub use state::{CreationStage, FailureReason};

use thiserror::Error;

/// Reasons a creation request is rejected before anything is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Customer ID is required.
    #[error("customer_id is required")]
    CustomerIdRequired,

    /// At least one product is required.
    #[error("products must contain at least one product")]
    NoProducts,

    /// A product identifier was empty.
    #[error("products[{index}] must not be blank")]
    BlankProduct { index: usize },
}
