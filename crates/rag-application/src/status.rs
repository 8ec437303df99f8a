//! Status Tracker (C2) business rules layered over the durable
//! `StatusTracker` port: monotonic progress and a default-on-absence read.

use std::sync::Arc;

use rag_domain::entities::StatusRecord;
use rag_domain::error::Result;
use rag_domain::ports::status::{StatusPublisher, StatusTracker};
use rag_domain::value_objects::DocumentState;
use serde_json::Value as Json;

/// Wraps a [`StatusTracker`] adapter with the monotonic-progress rule and
/// best-effort publish fan-out (§4.2).
pub struct StatusService {
    tracker: Arc<dyn StatusTracker>,
    publisher: Arc<dyn StatusPublisher>,
}

impl StatusService {
    /// Build a status service over the given tracker and publisher adapters.
    pub fn new(tracker: Arc<dyn StatusTracker>, publisher: Arc<dyn StatusPublisher>) -> Self {
        Self { tracker, publisher }
    }

    /// Advance `(bucket, key)` to `state`/`progress`. If the tracker
    /// already holds a higher `progress` than requested, the higher value
    /// wins — concurrent writers from different stages must never regress
    /// progress even when they race on `state`.
    pub async fn advance(
        &self,
        bucket: &str,
        key: &str,
        state: DocumentState,
        progress: u8,
        metadata: Option<Json>,
        user: Option<&str>,
    ) -> Result<StatusRecord> {
        let existing = self.tracker.get(bucket, key).await?;
        let effective_progress = existing
            .as_ref()
            .map_or(progress, |r| r.progress.max(progress));

        let record = self
            .tracker
            .update(bucket, key, state, effective_progress, metadata, user)
            .await?;

        self.publisher.publish(&record).await;
        Ok(record)
    }

    /// Fetch the current record, defaulting the caller's view to
    /// `processing_started` at 0% when no record exists yet (callers that
    /// must initialize progress computation use this instead of handling
    /// `None` themselves).
    pub async fn get_or_default(&self, bucket: &str, key: &str) -> Result<StatusRecord> {
        if let Some(record) = self.tracker.get(bucket, key).await? {
            return Ok(record);
        }
        Ok(StatusRecord {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            state: DocumentState::ProcessingStarted,
            progress: 0,
            error: None,
            pipeline: None,
            updated_at: chrono::Utc::now(),
        })
    }

    /// Sweep TTL-expired records; delegates directly to the tracker.
    pub async fn sweep_expired(&self) -> Result<u64> {
        self.tracker.sweep_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeTracker {
        record: Mutex<Option<StatusRecord>>,
    }

    #[async_trait]
    impl StatusTracker for FakeTracker {
        async fn update(
            &self,
            bucket: &str,
            key: &str,
            state: DocumentState,
            progress: u8,
            _metadata: Option<Json>,
            _user: Option<&str>,
        ) -> Result<StatusRecord> {
            let record = StatusRecord {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                state,
                progress,
                error: None,
                pipeline: None,
                updated_at: chrono::Utc::now(),
            };
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(record)
        }

        async fn get(&self, _bucket: &str, _key: &str) -> Result<Option<StatusRecord>> {
            Ok(self.record.lock().unwrap().clone())
        }

        async fn sweep_expired(&self) -> Result<u64> {
            Ok(0)
        }
    }

    struct NoopPublisher;

    #[async_trait]
    impl StatusPublisher for NoopPublisher {
        async fn publish(&self, _record: &StatusRecord) {}
    }

    #[tokio::test]
    async fn progress_never_regresses() {
        let service = StatusService::new(
            Arc::new(FakeTracker {
                record: Mutex::new(None),
            }),
            Arc::new(NoopPublisher),
        );

        service
            .advance("b", "k", DocumentState::Chunking, 60, None, None)
            .await
            .unwrap();

        let record = service
            .advance("b", "k", DocumentState::Embedding, 40, None, None)
            .await
            .unwrap();

        assert_eq!(record.progress, 60);
        assert_eq!(record.state, DocumentState::Embedding);
    }

    #[tokio::test]
    async fn get_or_default_initializes_processing_started() {
        let service = StatusService::new(
            Arc::new(FakeTracker {
                record: Mutex::new(None),
            }),
            Arc::new(NoopPublisher),
        );

        let record = service.get_or_default("b", "k").await.unwrap();
        assert_eq!(record.state, DocumentState::ProcessingStarted);
        assert_eq!(record.progress, 0);
    }
}
