//! Order service for the orders system.
//!
//! This crate owns the creation protocol that spans the two independent
//! side effects, the order store and the event bus:
//! - validate the request ([`CreateOrder`])
//! - build the order and its `OrderCreated` snapshot
//! - conditionally insert the order
//! - publish the event, best effort, only after the insert succeeded
//!
//! Retrieval reads the store alone.

pub mod clock;
pub mod error;
pub mod ids;
pub mod order;

pub use clock::{Clock, SystemClock};
pub use error::ServiceError;
pub use ids::{IdGenerator, RandomIds};
pub use order::{
    CreateOrder, CreationStage, FailureReason, NotificationStatus, OrderCreated, OrderService,
    ValidationError,
};
