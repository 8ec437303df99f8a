//! Status Tracker (C2): durable per-document lifecycle state plus
//! WebSocket fan-out.

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::entities::StatusRecord;
use crate::error::Result;
use crate::value_objects::DocumentState;

/// Durable, TTL-bounded lifecycle record store.
///
/// `update` is idempotent and monotonic in timestamp: concurrent writers
/// take last-writer-wins on `state` but always preserve the highest
/// observed `progress`. A successful write is expected to trigger a
/// best-effort publish via [`StatusPublisher`]; publish failures never
/// block the write.
#[async_trait]
pub trait StatusTracker: Send + Sync {
    /// Upsert the status for `(bucket, key)`. `user` is recorded for audit
    /// only when present.
    async fn update(
        &self,
        bucket: &str,
        key: &str,
        state: DocumentState,
        progress: u8,
        metadata: Option<Json>,
        user: Option<&str>,
    ) -> Result<StatusRecord>;

    /// Fetch the current record, or `None` if absent (absence is not an
    /// error; callers default to `processing_started` when they must
    /// initialize progress computation).
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<StatusRecord>>;

    /// Sweep and drop any record past its 24h TTL. Returns the number removed.
    async fn sweep_expired(&self) -> Result<u64>;
}

/// WebSocket (or other real-time transport) fan-out for status updates.
/// Publish failures are logged and swallowed by the caller; they never
/// block the data plane.
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Best-effort broadcast of `record` to every connection subscribed to
    /// its `statusId`. Implementations purge connections that report
    /// "gone" from their registry.
    async fn publish(&self, record: &StatusRecord);
}
