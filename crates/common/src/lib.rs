//! Domain model for the orders service.
//!
//! Holds the identifier newtypes, the immutable [`Order`] record and the
//! [`OrderCreatedEvent`] snapshot published when an order is created.

pub mod order;
pub mod timestamp;
pub mod types;

pub use order::{Order, OrderCreatedEvent};
pub use types::{CustomerId, EventId, OrderId, ProductId};
