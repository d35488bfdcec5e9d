//! Creation protocol state machine.

use order_store::StoreError;
use serde::{Deserialize, Serialize};

/// Why a creation request ended in [`CreationStage::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The order ID was already taken in the store.
    Conflict,

    /// The store could not be reached or failed.
    Unavailable,

    /// The order was stored but the bus did not accept the event.
    NotificationLost,
}

impl FailureReason {
    /// Classifies a failed insert.
    pub fn from_store_error(err: &StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => FailureReason::Conflict,
            _ => FailureReason::Unavailable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Conflict => "conflict",
            FailureReason::Unavailable => "unavailable",
            FailureReason::NotificationLost => "notification_lost",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stage of a single creation request.
///
/// ```text
/// Building ──► Persisting ──► Notifying ──► Completed
///                  │              │
///                  └──────────────┴──► Failed(reason)
/// ```
///
/// `Failed(NotificationLost)` still reports the creation as successful to
/// the caller: the order is durable, only its notification is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CreationStage {
    /// Identifiers and timestamp are being assigned.
    #[default]
    Building,

    /// Conditional insert in flight.
    Persisting,

    /// Insert succeeded, publish in flight.
    Notifying,

    /// Stored and published (terminal state).
    Completed,

    /// Stopped early (terminal state).
    Failed(FailureReason),
}

impl CreationStage {
    /// Returns true if moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: CreationStage) -> bool {
        use CreationStage::*;

        matches!(
            (self, next),
            (Building, Persisting)
                | (Persisting, Notifying)
                | (Notifying, Completed)
                | (Persisting, Failed(FailureReason::Conflict))
                | (Persisting, Failed(FailureReason::Unavailable))
                | (Notifying, Failed(FailureReason::NotificationLost))
        )
    }

    /// Moves to `next`, returning it. Illegal steps are a programming error.
    pub(crate) fn advance(self, next: CreationStage) -> CreationStage {
        debug_assert!(
            self.can_transition_to(next),
            "illegal creation transition {self} -> {next}"
        );
        tracing::debug!(from = %self, to = %next, "creation stage");
        next
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CreationStage::Completed | CreationStage::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreationStage::Building => "Building",
            CreationStage::Persisting => "Persisting",
            CreationStage::Notifying => "Notifying",
            CreationStage::Completed => "Completed",
            CreationStage::Failed(_) => "Failed",
        }
    }
}

impl std::fmt::Display for CreationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreationStage::Failed(reason) => write!(f, "Failed({reason})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
