use async_trait::async_trait;

use crate::{Order, OrderId, Result};

/// Key-value store for orders.
///
/// Orders are create-once, read-many: there is no update or delete path, so
/// a single-key conditional insert is the only concurrency control needed.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the order keyed by its ID, only if no record with that key exists.
    ///
    /// The write is atomic for the key. Fails with `AlreadyExists` when the
    /// key is taken and `Unavailable` for any backend failure.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Looks up an order by ID.
    ///
    /// Fails with `NotFound` if nothing was ever inserted under the key.
    async fn get(&self, order_id: &OrderId) -> Result<Order>;
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for std::sync::Arc<T> {
    async fn insert(&self, order: &Order) -> Result<()> {
        (**self).insert(order).await
    }

    async fn get(&self, order_id: &OrderId) -> Result<Order> {
        (**self).get(order_id).await
    }
}
