use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Order, OrderId, OrderRecord, Result, StoreError, partition_key, store::OrderStore};

/// In-memory order store for tests and local runs.
///
/// Records are kept in the same layout the PostgreSQL store uses, so reads
/// go through the same reconstruction path.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    records: Arc<RwLock<HashMap<String, OrderRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of stored orders.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no orders are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns true if a record exists for the order ID.
    pub async fn contains(&self, order_id: &OrderId) -> bool {
        self.records
            .read()
            .await
            .contains_key(&partition_key(order_id))
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        self.check_available()?;

        let record = OrderRecord::from_order(order);
        let mut records = self.records.write().await;

        // Check and write under the same lock.
        match records.entry(record.pk.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(order.order_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, order_id: &OrderId) -> Result<Order> {
        self.check_available()?;

        let record = self
            .records
            .read()
            .await
            .get(&partition_key(order_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(order_id.clone()))?;

        record.into_order()
    }
}
