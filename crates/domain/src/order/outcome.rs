use common::{EventId, Order};

use super::CreationStage;

/// What happened to the `OrderCreated` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    /// The bus accepted the event.
    Published,

    /// The bus rejected the event; the order is stored regardless.
    Lost(String),
}

impl NotificationStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, NotificationStatus::Published)
    }
}

/// Result of a successful creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    /// The order as persisted.
    pub order: Order,

    /// ID of the event built alongside the order.
    pub event_id: EventId,

    /// Whether downstream consumers were told.
    pub notification: NotificationStatus,
}

impl OrderCreated {
    /// Terminal stage the request reached.
    pub fn stage(&self) -> CreationStage {
        match self.notification {
            NotificationStatus::Published => CreationStage::Completed,
            NotificationStatus::Lost(_) => {
                CreationStage::Failed(super::FailureReason::NotificationLost)
            }
        }
    }
}
