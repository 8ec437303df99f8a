//! In-process `StatusPublisher` adapter: a registry of per-`statusId`
//! WebSocket sender handles, fanned out to on every status write. A
//! connection whose send fails (client gone) is dropped from the
//! registry instead of retried — the client will re-subscribe on
//! reconnect.

use async_trait::async_trait;
use dashmap::DashMap;
use rag_domain::entities::StatusRecord;
use rag_domain::log_warn;
use rag_domain::ports::status::StatusPublisher;
use tokio::sync::mpsc::UnboundedSender;

fn status_id(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

/// One broadcast channel per `(bucket, key)`. Multiple tabs/devices
/// watching the same document each register their own sender and all
/// receive every update.
#[derive(Default)]
pub struct WsStatusRegistry {
    subscribers: DashMap<String, Vec<UnboundedSender<StatusRecord>>>,
}

impl WsStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new WebSocket connection's outbound channel for
    /// `(bucket, key)`.
    pub fn subscribe(&self, bucket: &str, key: &str, sender: UnboundedSender<StatusRecord>) {
        self.subscribers
            .entry(status_id(bucket, key))
            .or_default()
            .push(sender);
    }

    /// Drop every subscriber for `(bucket, key)`, e.g. once the document
    /// reaches a terminal state and no further updates are expected.
    pub fn clear(&self, bucket: &str, key: &str) {
        self.subscribers.remove(&status_id(bucket, key));
    }
}

#[async_trait]
impl StatusPublisher for WsStatusRegistry {
    async fn publish(&self, record: &StatusRecord) {
        let id = status_id(&record.bucket, &record.key);
        let Some(mut entry) = self.subscribers.get_mut(&id) else {
            return;
        };
        entry.retain(|sender| match sender.send(record.clone()) {
            Ok(()) => true,
            Err(_) => {
                log_warn!("status_ws", &format!("dropping subscriber for {id} (send failed)"));
                false
            }
        });
    }
}
