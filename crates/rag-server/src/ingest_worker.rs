//! Drains the upload-notifications queue and hands batches to the
//! Ingestion Orchestrator (C4, §4.4). Same consume-loop shape as the
//! lane workers: receive, process, ack/nack.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rag_application::ingestion::{IngestionOrchestrator, RecordOutcome, UploadNotification};
use rag_domain::error::Result;
use rag_domain::log_error;
use rag_domain::ports::metrics::MetricsCollector;
use rag_domain::ports::queue::Queue;

const BATCH_SIZE: usize = 8;
const IDLE_SLEEP: Duration = Duration::from_millis(500);

pub struct IngestWorker {
    queue_url: String,
    queue: Arc<dyn Queue>,
    ingestion: Arc<IngestionOrchestrator>,
    metrics: Arc<dyn MetricsCollector>,
}

impl IngestWorker {
    pub fn new(
        queue_url: impl Into<String>,
        queue: Arc<dyn Queue>,
        ingestion: Arc<IngestionOrchestrator>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        Self {
            queue_url: queue_url.into(),
            queue,
            ingestion,
            metrics,
        }
    }

    pub async fn run(&self) -> Result<()> {
        loop {
            let messages = self.queue.receive(&self.queue_url, BATCH_SIZE).await?;
            self.metrics.record_queue_depth(&self.queue_url, messages.len() as u64);
            if messages.is_empty() {
                tokio::time::sleep(IDLE_SLEEP).await;
                continue;
            }

            let mut notifications = Vec::with_capacity(messages.len());
            let mut receipts = Vec::with_capacity(messages.len());
            for message in messages {
                match serde_json::from_value::<UploadNotification>(message.body) {
                    Ok(notification) => {
                        notifications.push(notification);
                        receipts.push(message.receipt);
                    }
                    Err(e) => {
                        log_error!("ingest_worker", &format!("dropping malformed notification: {e}"));
                        self.queue.delete(&self.queue_url, &message.receipt).await?;
                    }
                }
            }

            let started = Instant::now();
            let outcomes = self.ingestion.process_batch(&notifications).await;
            self.metrics.record_stage_latency(
                "ingestion_orchestrator",
                started.elapsed(),
                !outcomes.iter().any(|o| matches!(o, RecordOutcome::Failed { .. })),
            );
            for (outcome, receipt) in outcomes.iter().zip(receipts.iter()) {
                match outcome {
                    RecordOutcome::Failed { bucket, key, reason } => {
                        log_error!(
                            "ingest_worker",
                            &format!("record failed, dropping: {bucket}/{key}: {reason}")
                        );
                        self.queue.delete(&self.queue_url, receipt).await?;
                    }
                    _ => {
                        self.queue.delete(&self.queue_url, receipt).await?;
                    }
                }
            }
        }
    }
}
