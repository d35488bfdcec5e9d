//! Event notification for the orders service.
//!
//! An [`EventNotifier`] wraps a domain event in a [`MessageEnvelope`] and
//! hands it to a message bus under a [`Topic`]. Delivery to subscribers is
//! at-least-once and unordered across publish calls; consumers dedup on
//! `order_id` if they need to.

pub mod envelope;
pub mod error;
pub mod memory;
pub mod notifier;
pub mod postgres;
pub mod topic;

pub use envelope::{EnvelopeMetadata, MessageEnvelope, ServiceInfo};
pub use error::{NotifierError, Result};
pub use memory::{InMemoryNotifier, PublishedMessage};
pub use notifier::{EventNotifier, PayloadStream};
pub use postgres::PgNotifyNotifier;
pub use topic::{ORDER_CREATED, Topic};

/// Service name stamped into envelopes when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "service-orders";
