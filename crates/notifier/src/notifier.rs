use std::pin::Pin;

use async_trait::async_trait;
use common::OrderCreatedEvent;
use futures_core::Stream;

use crate::{Result, Topic};

/// A stream of raw envelope payloads received from a topic.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Publishes events to a message bus.
///
/// `Ok` means the bus accepted the message; delivery from there on is the
/// bus's at-least-once guarantee. No ordering holds across publish calls.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Wraps `event` in the service envelope and hands it to the bus under `topic`.
    async fn publish(&self, topic: &Topic, event: &OrderCreatedEvent) -> Result<()>;
}

#[async_trait]
impl<T: EventNotifier + ?Sized> EventNotifier for std::sync::Arc<T> {
    async fn publish(&self, topic: &Topic, event: &OrderCreatedEvent) -> Result<()> {
        (**self).publish(topic, event).await
    }
}
