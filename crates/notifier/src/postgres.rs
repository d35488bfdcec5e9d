use std::time::Duration;

use async_trait::async_trait;
use common::OrderCreatedEvent;
use futures_util::StreamExt;
use sqlx::PgPool;
use sqlx::postgres::PgListener;

use crate::{
    DEFAULT_SERVICE_NAME, EventNotifier, MessageEnvelope, NotifierError, PayloadStream, Result,
    Topic,
};

/// Largest payload PostgreSQL accepts for a notification.
pub const MAX_PAYLOAD_BYTES: usize = 7999;

const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Bus backed by PostgreSQL `NOTIFY`/`LISTEN`.
///
/// Topics map to notification channels. The server accepts a notification
/// once the publishing statement commits and delivers it to every session
/// listening on that channel.
#[derive(Clone)]
pub struct PgNotifyNotifier {
    pool: PgPool,
    service_name: String,
    publish_timeout: Duration,
}

impl PgNotifyNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
        }
    }

    /// Sets the service name written into envelopes.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Bounds how long a single publish may take.
    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Listens on `topic` and yields every payload received after the call.
    pub async fn subscribe(&self, topic: &Topic) -> Result<PayloadStream> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(topic.as_str()).await?;

        let stream = listener.into_stream().map(|result| match result {
            Ok(notification) => Ok(notification.payload().to_string()),
            Err(e) => Err(NotifierError::from(e)),
        });

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl EventNotifier for PgNotifyNotifier {
    #[tracing::instrument(skip(self, event), fields(event_id = %event.event_id, order_id = %event.order_id))]
    async fn publish(&self, topic: &Topic, event: &OrderCreatedEvent) -> Result<()> {
        let payload = MessageEnvelope::wrap(&self.service_name, topic, event).to_json()?;

        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(NotifierError::PayloadTooLarge {
                size: payload.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        let notify = sqlx::query("SELECT pg_notify($1, $2)")
            .bind(topic.as_str())
            .bind(&payload)
            .execute(&self.pool);

        tokio::time::timeout(self.publish_timeout, notify)
            .await
            .map_err(|_| NotifierError::Timeout(self.publish_timeout))??;

        tracing::debug!(%topic, bytes = payload.len(), "notification sent");
        Ok(())
    }
}
