//! Typed event fan-out (§9 redesign note: replaces the Python
//! `send_event` callback chains with a channel subscribers register on at
//! boot, instead of a global mutable registry).

use async_trait::async_trait;

use crate::events::DomainEvent;

/// A boot-time subscriber to domain events. Implementations must not
/// block the publisher; slow subscribers should buffer internally.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Handle one published event. Errors are logged by the publisher and
    /// never propagated back to the stage that raised the event.
    async fn handle(&self, event: &DomainEvent);
}

/// Fan-out publisher all pipeline stages raise events through.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event` to every registered subscriber.
    async fn publish(&self, event: DomainEvent);
}
