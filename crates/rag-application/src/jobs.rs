//! Embedding Job Ledger (C12): job state machine, cooperative
//! cancellation, and partial re-embedding orchestration (§4.12).

use std::collections::HashMap;
use std::sync::Arc;

use rag_domain::entities::ChunkBm25Row;
use rag_domain::error::{Error, Result};
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::ports::jobs::{JobLedger, JobResult};
use rag_domain::ports::object_store::ObjectStore;
use rag_domain::ports::vector_store::VectorStore;
use rag_domain::text::tokenize;
use rag_domain::value_objects::JobState;
use serde_json::Value as Json;
use tracing::info;

/// Result payloads above this size (bytes, approximated by the
/// serialized JSON length) are written to the object store instead of
/// inlined in the ledger row.
const INLINE_RESULT_MAX_BYTES: usize = 256 * 1024;

/// Orchestrates C12's job lifecycle and the partial re-embedding use case.
pub struct JobLedgerService {
    ledger: Arc<dyn JobLedger>,
    object_store: Arc<dyn ObjectStore>,
    embedder: Arc<dyn EmbeddingApi>,
    vectors: Arc<dyn VectorStore>,
    bm25: Arc<dyn Bm25Store>,
}

impl JobLedgerService {
    pub fn new(
        ledger: Arc<dyn JobLedger>,
        object_store: Arc<dyn ObjectStore>,
        embedder: Arc<dyn EmbeddingApi>,
        vectors: Arc<dyn VectorStore>,
        bm25: Arc<dyn Bm25Store>,
    ) -> Self {
        Self {
            ledger,
            object_store,
            embedder,
            vectors,
            bm25,
        }
    }

    /// Start a new job, returning its id.
    pub async fn init(&self, owner: &str, document_id: &str) -> Result<String> {
        self.ledger.init(owner, document_id, JobState::Queued).await
    }

    /// Record the job's result, spilling to the object store when the
    /// inline payload would be too large.
    pub async fn set_result(&self, owner: &str, job_id: &str, result: &Json) -> Result<()> {
        let serialized = serde_json::to_vec(result)?;
        if serialized.len() <= INLINE_RESULT_MAX_BYTES {
            return self
                .ledger
                .set_result(owner, job_id, JobResult::Inline(result.clone()))
                .await;
        }

        let bucket = owner.to_owned();
        let key = format!("{owner}/{job_id}/result.json");
        self.object_store
            .put(&bucket, &key, &serialized, "application/json")
            .await?;
        self.ledger
            .set_result(owner, job_id, JobResult::Blob { bucket, key })
            .await
    }

    /// Cooperative cancellation request.
    pub async fn stop(&self, owner: &str, job_id: &str) -> Result<()> {
        self.ledger.stop(owner, job_id).await
    }

    /// Fetch a job by id, for operator status/cancel tooling.
    pub async fn get(&self, owner: &str, job_id: &str) -> Result<rag_domain::entities::EmbeddingJob> {
        self.ledger.get(owner, job_id).await
    }

    /// Between-chunk check the worker must perform; returns `true` when
    /// the worker should write a terminal status and exit without
    /// emitting further chunks.
    pub async fn should_stop(&self, job_id: &str) -> Result<bool> {
        Ok(self.ledger.poll_state(job_id).await?.is_stop_requested())
    }

    /// Re-embed exactly the chunks in `chunk_ids` (§4.12 partial
    /// re-embedding): re-run the dense embedder over their existing
    /// content, upsert the new vectors, and replace (not merge) their
    /// BM25 rows, leaving `total_chunks` unchanged. Cooperatively checks
    /// the job's state between chunks.
    pub async fn reindex_subset(
        &self,
        owner: &str,
        job_id: &str,
        document_id: &str,
        embedding_model: &str,
        chunk_ids: &[String],
    ) -> Result<usize> {
        let mut reembedded = 0usize;
        let mut bm25_rows = Vec::with_capacity(chunk_ids.len());

        for chunk_id in chunk_ids {
            if self.should_stop(job_id).await? {
                info!(job_id, "reindex stopped cooperatively between chunks");
                self.ledger.update(owner, job_id, JobState::Stopped).await?;
                return Ok(reembedded);
            }

            let Some(mut chunk) = self.vectors.get_chunk(chunk_id).await? else {
                continue;
            };
            if chunk.document_id != document_id {
                return Err(Error::validation(format!(
                    "chunk {chunk_id} does not belong to document {document_id}"
                )));
            }

            let embeddings = self
                .embedder
                .embed(embedding_model, std::slice::from_ref(&chunk.content))
                .await?;
            chunk.embedding = embeddings.into_iter().next();
            chunk.updated_at = chrono::Utc::now();
            self.vectors.upsert_chunk(&chunk).await?;

            let terms = tokenize(&chunk.content);
            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for term in &terms {
                *term_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            bm25_rows.push(ChunkBm25Row {
                chunk_id: chunk_id.clone(),
                document_id: document_id.to_owned(),
                doc_length: terms.len() as u32,
                term_freqs,
                ordinal: chunk.ordinal,
            });

            reembedded += 1;
        }

        if !bm25_rows.is_empty() {
            self.bm25.replace_chunks(document_id, &bm25_rows).await?;
        }

        self.ledger.update(owner, job_id, JobState::Finished).await?;
        Ok(reembedded)
    }
}
