use common::{EventId, OrderId};

/// Source of fresh identifiers for new orders and their events.
pub trait IdGenerator: Send + Sync {
    fn order_id(&self) -> OrderId;
    fn event_id(&self) -> EventId;
}

/// Random UUIDv4 identifiers. Collisions are treated as negligible but the
/// store still rejects them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn order_id(&self) -> OrderId {
        OrderId::generate()
    }

    fn event_id(&self) -> EventId {
        EventId::new()
    }
}
