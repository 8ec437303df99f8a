//! Embedding Job Ledger (C12) persistence port.

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::entities::EmbeddingJob;
use crate::error::Result;
use crate::value_objects::JobState;

/// Where a job's result ultimately lives.
#[derive(Debug, Clone)]
pub enum JobResult {
    /// Small enough to store directly in the ledger row.
    Inline(Json),
    /// Too large to inline; stored at `{bucket}/{key}`, conventionally
    /// `{user}/{jobId}/result.json`.
    Blob { bucket: String, key: String },
}

/// Durable store for long-running embedding jobs.
#[async_trait]
pub trait JobLedger: Send + Sync {
    /// Create a new job row for `document_id`, owned by `owner`, in
    /// `initial_state`. Returns the generated job id.
    async fn init(&self, owner: &str, document_id: &str, initial_state: JobState) -> Result<String>;

    /// Transition `job_id`'s state. `owner` must match the job's recorded
    /// owner, else [`crate::error::Error::Forbidden`].
    async fn update(&self, owner: &str, job_id: &str, state: JobState) -> Result<()>;

    /// Record the job's result, inline or as a blob pointer.
    async fn set_result(&self, owner: &str, job_id: &str, result: JobResult) -> Result<()>;

    /// Cooperative cancellation: set state to `stopped`.
    async fn stop(&self, owner: &str, job_id: &str) -> Result<()>;

    /// Fetch a job by id.
    async fn get(&self, owner: &str, job_id: &str) -> Result<EmbeddingJob>;

    /// Poll the current state only, for the worker's between-chunk check.
    async fn poll_state(&self, job_id: &str) -> Result<JobState>;

    /// Delete a job row (operator `reindex`/cleanup path).
    async fn delete(&self, owner: &str, job_id: &str) -> Result<()>;
}
