//! Lane queue external contract (§6): at-least-once delivery with a
//! visibility timeout, consumed by C4 (send) and the lane workers (receive).

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::error::Result;

/// One in-flight message, carrying the opaque receipt needed to
/// acknowledge or nack it.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Deserialized message body.
    pub body: Json,
    /// Opaque handle used by `delete`/`extend_visibility`.
    pub receipt: String,
}

/// At-least-once queue, one instance per lane.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Enqueue `body` onto `queue_url`.
    async fn send(&self, queue_url: &str, body: &Json) -> Result<()>;

    /// Pull up to `max_messages` available messages, each becoming
    /// invisible to other consumers for the queue's visibility window.
    async fn receive(&self, queue_url: &str, max_messages: usize) -> Result<Vec<QueueMessage>>;

    /// Acknowledge and permanently remove a message.
    async fn delete(&self, queue_url: &str, receipt: &str) -> Result<()>;

    /// Nack a message by setting its visibility timeout to `seconds`; `0`
    /// returns it to other consumers immediately.
    async fn extend_visibility(&self, queue_url: &str, receipt: &str, seconds: u64) -> Result<()>;
}
