use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerId, EventId, OrderId, ProductId};

/// A confirmed purchase.
///
/// Orders are never updated after creation; the store only ever inserts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by the service at creation time.
    pub order_id: OrderId,

    /// The customer who placed the order.
    pub customer_id: CustomerId,

    /// Ordered products. Duplicates are kept as submitted.
    pub products: Vec<ProductId>,

    /// When the order was created.
    #[serde(with = "crate::timestamp::iso8601")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        customer_id: CustomerId,
        products: Vec<ProductId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            customer_id,
            products,
            created_at,
        }
    }
}

/// Notification that an order was created.
///
/// An immutable snapshot of the order taken when it was built, plus an
/// `event_id` that identifies this particular notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub products: Vec<ProductId>,
    #[serde(with = "crate::timestamp::iso8601")]
    pub created_at: DateTime<Utc>,
}

impl OrderCreatedEvent {
    /// Builds the event for `order`, copying every order field.
    pub fn snapshot_of(event_id: EventId, order: &Order) -> Self {
        Self {
            event_id,
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            products: order.products.clone(),
            created_at: order.created_at,
        }
    }
}
