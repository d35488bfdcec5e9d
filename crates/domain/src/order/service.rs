//! Order service: creation protocol and retrieval.

use std::sync::Arc;

use common::{Order, OrderCreatedEvent, OrderId};
use notifier::{EventNotifier, Topic};
use order_store::OrderStore;

use crate::clock::{Clock, SystemClock};
use crate::error::ServiceError;
use crate::ids::{IdGenerator, RandomIds};

use super::{CreateOrder, CreationStage, FailureReason, NotificationStatus, OrderCreated};

/// Service for creating and loading orders.
///
/// Holds no per-request state; concurrent requests coordinate only through
/// the store's conditional insert. The two awaits in `create_order` are the
/// only suspension points and no lock is held across them.
pub struct OrderService<S, N> {
    store: S,
    notifier: N,
    topic: Topic,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl<S: OrderStore, N: EventNotifier> OrderService<S, N> {
    /// Creates a service publishing creation events to `topic`.
    pub fn new(store: S, notifier: N, topic: Topic) -> Self {
        Self {
            store,
            notifier,
            topic,
            ids: Arc::new(RandomIds),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the identifier source.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Creates an order: build, persist, then notify.
    ///
    /// A failed insert aborts the request and nothing is published. A failed
    /// publish after a successful insert is reported through
    /// [`OrderCreated::notification`], not as an error: the stored order is
    /// the source of truth and is never rolled back. If the caller drops this
    /// future after the insert, the order stays stored and the publish may
    /// not happen.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id()))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderCreated, ServiceError> {
        let stage = CreationStage::Building;
        let (order, event) = self.build(cmd);

        let stage = stage.advance(CreationStage::Persisting);
        if let Err(err) = self.store.insert(&order).await {
            let reason = FailureReason::from_store_error(&err);
            stage.advance(CreationStage::Failed(reason));
            metrics::counter!("order_creation_failed_total", "reason" => reason.as_str())
                .increment(1);
            tracing::error!(
                order_id = %order.order_id,
                %reason,
                error = %err,
                "order not persisted, skipping notification"
            );
            return Err(err.into());
        }
        metrics::counter!("orders_created_total").increment(1);

        let stage = stage.advance(CreationStage::Notifying);
        let notification = match self.notifier.publish(&self.topic, &event).await {
            Ok(()) => {
                stage.advance(CreationStage::Completed);
                NotificationStatus::Published
            }
            Err(err) => {
                stage.advance(CreationStage::Failed(FailureReason::NotificationLost));
                metrics::counter!("order_notifications_lost_total").increment(1);
                tracing::warn!(
                    order_id = %order.order_id,
                    event_id = %event.event_id,
                    topic = %self.topic,
                    error = %err,
                    "order persisted but notification lost"
                );
                NotificationStatus::Lost(err.to_string())
            }
        };

        tracing::info!(
            order_id = %order.order_id,
            event_id = %event.event_id,
            published = notification.is_published(),
            "order_created"
        );

        Ok(OrderCreated {
            order,
            event_id: event.event_id,
            notification,
        })
    }

    /// Loads an order from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, ServiceError> {
        match self.store.get(order_id).await {
            Ok(order) => {
                metrics::counter!("order_lookups_total", "result" => "found").increment(1);
                Ok(order)
            }
            Err(err) => {
                let err = ServiceError::from(err);
                match &err {
                    ServiceError::NotFound(_) => {
                        metrics::counter!("order_lookups_total", "result" => "not_found")
                            .increment(1);
                        tracing::info!("order_not_found");
                    }
                    other => {
                        metrics::counter!("order_lookups_total", "result" => "error")
                            .increment(1);
                        tracing::error!(error = %other, "order lookup failed");
                    }
                }
                Err(err)
            }
        }
    }

    fn build(&self, cmd: CreateOrder) -> (Order, OrderCreatedEvent) {
        let (customer_id, products) = cmd.into_parts();
        let order = Order::new(self.ids.order_id(), customer_id, products, self.clock.now());
        let event = OrderCreatedEvent::snapshot_of(self.ids.event_id(), &order);
        (order, event)
    }
}
