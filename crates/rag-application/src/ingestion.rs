//! Ingestion Orchestrator (C4): consumes upload-notification messages,
//! validates, classifies, stashes credentials, and enqueues lane work.

use std::collections::HashMap;
use std::sync::Arc;

use rag_domain::classify::classify;
use rag_domain::error::Error;
use rag_domain::ports::object_store::ObjectStore;
use rag_domain::ports::queue::Queue;
use rag_domain::ports::secrets::SecretsBroker;
use rag_domain::value_objects::{DocumentState, Lane};
use serde::Deserialize;
use serde_json::{json, Value as Json};
use tracing::{error, info};

use crate::status::StatusService;

/// One inbound upload-notification record (§4.4).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadNotification {
    pub bucket: String,
    pub key: String,
    pub user: String,
    #[serde(default)]
    pub force_reprocess: bool,
}

/// Outcome of processing a single record; the orchestrator never lets one
/// record's failure stop the batch, so callers get one of these per input
/// rather than a short-circuiting `Result`.
#[derive(Debug)]
pub enum RecordOutcome {
    Enqueued { bucket: String, key: String, lane: Lane },
    Failed { bucket: String, key: String, reason: String },
    Skipped { bucket: String, key: String },
}

/// Per-lane queue URL resolution. A missing lane is itself a per-record
/// failure (§4.4 step 6), never a panic.
pub trait LaneQueues: Send + Sync {
    fn queue_url(&self, lane: Lane) -> Option<&str>;
}

/// Orchestrates C4's per-record pipeline over injected ports.
pub struct IngestionOrchestrator {
    object_store: Arc<dyn ObjectStore>,
    queue: Arc<dyn Queue>,
    secrets: Arc<dyn SecretsBroker>,
    status: Arc<StatusService>,
    lanes: Arc<dyn LaneQueues>,
}

impl IngestionOrchestrator {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        queue: Arc<dyn Queue>,
        secrets: Arc<dyn SecretsBroker>,
        status: Arc<StatusService>,
        lanes: Arc<dyn LaneQueues>,
    ) -> Self {
        Self {
            object_store,
            queue,
            secrets,
            status,
            lanes,
        }
    }

    /// Process a full batch, never returning until every record is
    /// acknowledged (enqueued) or per-record failed. One bad record never
    /// poisons the rest.
    pub async fn process_batch(&self, batch: &[UploadNotification]) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for notification in batch {
            let outcome = self.process_one(notification).await;
            if let RecordOutcome::Failed { bucket, key, reason } = &outcome {
                error!(bucket, key, reason, "ingestion record failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn process_one(&self, notification: &UploadNotification) -> RecordOutcome {
        let UploadNotification {
            bucket,
            key,
            user,
            force_reprocess,
        } = notification;

        if let Err(e) = self
            .status
            .advance(bucket, key, DocumentState::Validating, 1, None, Some(user))
            .await
        {
            error!(bucket, key, error = %e, "failed to record validating status");
        }

        let metadata = match self.object_store.head(bucket, key).await {
            Ok(meta) => meta,
            Err(e) => {
                self.fail(bucket, key, "validation", &e.to_string()).await;
                return RecordOutcome::Failed {
                    bucket: bucket.clone(),
                    key: key.clone(),
                    reason: e.to_string(),
                };
            }
        };

        let rag_enabled = metadata
            .metadata
            .get("rag_enabled")
            .and_then(Json::as_bool)
            .unwrap_or(false);
        if !rag_enabled && !force_reprocess {
            return RecordOutcome::Skipped {
                bucket: bucket.clone(),
                key: key.clone(),
            };
        }

        let document_key = format!("{bucket}/{key}");
        let credentials = match self.secrets.get(&document_key).await {
            Ok(parcel) => parcel,
            Err(e) => {
                let reason = format!("missing credential parcel: {e}");
                self.fail(bucket, key, "credentials", &reason).await;
                return RecordOutcome::Failed {
                    bucket: bucket.clone(),
                    key: key.clone(),
                    reason,
                };
            }
        };

        let lane = classify(key, &metadata.mime, &metadata.metadata, metadata.size);

        let Some(queue_url) = self.lanes.queue_url(lane) else {
            let reason = format!("no queue configured for lane {lane}");
            self.fail(bucket, key, "routing", &reason).await;
            return RecordOutcome::Failed {
                bucket: bucket.clone(),
                key: key.clone(),
                reason,
            };
        };

        let payload = json!({
            "bucket": bucket,
            "key": key,
            "lane": lane,
            "size": metadata.size,
            "mime": metadata.mime,
            "force_reprocess": force_reprocess,
            "user": user,
            "credentials": credentials,
        });

        if let Err(e) = self.queue.send(queue_url, &payload).await {
            let reason = e.to_string();
            self.fail(bucket, key, "enqueue", &reason).await;
            return RecordOutcome::Failed {
                bucket: bucket.clone(),
                key: key.clone(),
                reason,
            };
        }

        if let Err(e) = self
            .status
            .advance(bucket, key, DocumentState::Queued, 5, None, Some(user))
            .await
        {
            error!(bucket, key, error = %e, "failed to record queued status");
        }

        info!(bucket, key, %lane, "enqueued for ingestion");
        RecordOutcome::Enqueued {
            bucket: bucket.clone(),
            key: key.clone(),
            lane,
        }
    }

    async fn fail(&self, bucket: &str, key: &str, stage: &str, message: &str) {
        let metadata = HashMap::from([("stage".to_owned(), json!(stage))]);
        if let Err(e) = self
            .status
            .advance(
                bucket,
                key,
                DocumentState::Failed,
                100,
                Some(json!({ "error": message, "metadata": metadata })),
                None,
            )
            .await
        {
            error!(bucket, key, error = %e, "failed to record failed status");
        }
    }
}

/// Wraps a fatal per-document error (missing credentials, unreadable
/// source) at the orchestrator boundary, for callers that want a typed
/// error rather than [`RecordOutcome::Failed`]'s string reason.
pub fn fatal_for(document_id: &str, stage: &str, message: impl Into<String>) -> Error {
    Error::fatal(document_id, stage, message)
}
