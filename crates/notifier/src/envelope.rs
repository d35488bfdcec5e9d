//! Outer message shape shared by every bus backend.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, Topic};

/// Version tag written into every envelope.
pub const PROTOCOL_VERSION: &str = "orders-json-v1";

/// Encoding of `data`. Events are embedded as plain JSON.
pub const DATA_ENCODING_RAW: &str = "raw";

/// Identifies the service that published a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
}

/// Per-message metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    /// Unique per publish call; differs from the event's own `event_id`.
    pub message_id: Uuid,
    pub protocol_version: String,
    #[serde(with = "common::timestamp::iso8601")]
    pub timestamp: DateTime<Utc>,
    pub topic: String,
    pub data_encoding: String,
}

/// A published message: stable outer shape with the event verbatim in `data`.
///
/// ```json
/// {
///   "service": {"name": "service-orders"},
///   "metadata": {"message_id": "...", "protocol_version": "orders-json-v1",
///                "timestamp": "...", "topic": "order--created", "data_encoding": "raw"},
///   "data": {"event_id": "...", "order_id": "...", ...}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    pub service: ServiceInfo,
    pub metadata: EnvelopeMetadata,
    pub data: T,
}

impl<T: Serialize> MessageEnvelope<T> {
    /// Wraps `data` for publication on `topic`.
    pub fn wrap(service_name: &str, topic: &Topic, data: T) -> Self {
        Self {
            service: ServiceInfo {
                name: service_name.to_string(),
            },
            metadata: EnvelopeMetadata {
                message_id: Uuid::new_v4(),
                protocol_version: PROTOCOL_VERSION.to_string(),
                timestamp: Utc::now(),
                topic: topic.to_string(),
                data_encoding: DATA_ENCODING_RAW.to_string(),
            },
            data,
        }
    }

    /// Encodes the envelope as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: DeserializeOwned> MessageEnvelope<T> {
    /// Parses a received payload.
    pub fn open(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
