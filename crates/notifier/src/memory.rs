use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use common::OrderCreatedEvent;
use futures_util::stream;
use tokio::sync::broadcast;

use crate::{
    DEFAULT_SERVICE_NAME, EventNotifier, MessageEnvelope, NotifierError, PayloadStream, Result,
    Topic,
};

const CHANNEL_CAPACITY: usize = 1024;

/// Messages kept in the published log by default.
pub const DEFAULT_LOG_CAPACITY: usize = 1024;

/// A message the in-memory bus accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: Topic,
    pub payload: String,
}

impl PublishedMessage {
    /// Decodes the payload back into the event it carries.
    pub fn event(&self) -> Result<OrderCreatedEvent> {
        Ok(MessageEnvelope::<OrderCreatedEvent>::open(&self.payload)?.data)
    }
}

/// In-process bus for tests and local runs.
///
/// Fans messages out to live subscribers over a broadcast channel and keeps a
/// log of the most recent messages it accepted, dropping the oldest once
/// `log_capacity` is reached. A topic with no subscribers still accepts
/// messages.
#[derive(Clone)]
pub struct InMemoryNotifier {
    service_name: String,
    sender: broadcast::Sender<PublishedMessage>,
    log: Arc<Mutex<VecDeque<PublishedMessage>>>,
    log_capacity: usize,
    accepted: Arc<AtomicUsize>,
    fail_on_publish: Arc<AtomicBool>,
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl InMemoryNotifier {
    pub fn new(service_name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            service_name: service_name.into(),
            sender,
            log: Arc::new(Mutex::new(VecDeque::new())),
            log_capacity: DEFAULT_LOG_CAPACITY,
            accepted: Arc::new(AtomicUsize::new(0)),
            fail_on_publish: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Keeps at most `capacity` messages in the published log.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Makes subsequent publish calls fail until reset.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    /// The retained messages, oldest first.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of messages accepted so far, including ones no longer retained.
    pub fn published_count(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Receives payloads published to `topic` after this call.
    pub fn subscribe(&self, topic: &Topic) -> PayloadStream {
        let receiver = self.sender.subscribe();
        let topic = topic.clone();

        Box::pin(stream::unfold(receiver, move |mut receiver| {
            let topic = topic.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(message) if message.topic == topic => {
                            return Some((Ok(message.payload), receiver));
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "in-memory subscriber lagged");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        }))
    }
}

#[async_trait]
impl EventNotifier for InMemoryNotifier {
    async fn publish(&self, topic: &Topic, event: &OrderCreatedEvent) -> Result<()> {
        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(NotifierError::Bus("in-memory bus rejected message".to_string()));
        }

        let payload = MessageEnvelope::wrap(&self.service_name, topic, event).to_json()?;
        let message = PublishedMessage {
            topic: topic.clone(),
            payload,
        };

        {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            if self.log_capacity > 0 {
                if log.len() == self.log_capacity {
                    log.pop_front();
                }
                log.push_back(message.clone());
            }
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);

        // No live subscribers is not an error.
        let receivers = self.sender.send(message).unwrap_or(0);
        tracing::debug!(%topic, event_id = %event.event_id, receivers, "message published");
        Ok(())
    }
}
