//! Persisted layout of an order.

use serde::{Deserialize, Serialize};

use common::timestamp;
use common::{CustomerId, Order, OrderId, ProductId};

use crate::{Result, StoreError};

const PARTITION_KEY_PREFIX: &str = "ORDER#";

/// Derives the store's partition key from an order ID.
pub fn partition_key(order_id: &OrderId) -> String {
    format!("{PARTITION_KEY_PREFIX}{order_id}")
}

/// One stored order, keyed by [`partition_key`].
///
/// Every attribute is a plain string so the record reads the same from any
/// backend; `created_at` is ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub pk: String,
    pub order_id: String,
    pub customer_id: String,
    pub products: Vec<String>,
    pub created_at: String,
}

impl OrderRecord {
    pub fn from_order(order: &Order) -> Self {
        Self {
            pk: partition_key(&order.order_id),
            order_id: order.order_id.to_string(),
            customer_id: order.customer_id.to_string(),
            products: order.products.iter().map(ToString::to_string).collect(),
            created_at: timestamp::to_iso8601(&order.created_at),
        }
    }

    /// Reconstructs the order, failing if the timestamp cannot be parsed.
    pub fn into_order(self) -> Result<Order> {
        let created_at =
            timestamp::from_iso8601(&self.created_at).map_err(|e| StoreError::InvalidRecord {
                order_id: self.order_id.clone(),
                reason: format!("created_at {:?}: {e}", self.created_at),
            })?;

        Ok(Order::new(
            OrderId::new(self.order_id),
            CustomerId::new(self.customer_id),
            self.products.into_iter().map(ProductId::new).collect(),
            created_at,
        ))
    }
}
