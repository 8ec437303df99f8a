//! Lane queue consumer loop: each [`LaneWorker`] pulls one lane's queue,
//! runs the format-appropriate extract/embed/index pipeline per §4.5-§4.9
//! (text lane) or §4.6/§4.10 (visual lane), and reports progress through
//! the same [`StatusService`] the orchestrator writes to.
//!
//! One worker per lane per replica, the same shape as the teacher's own
//! queue-consumer tasks: a `receive` loop, a bounded amount of work per
//! message, and an explicit ack/nack rather than relying on the queue's
//! own redelivery timing.

use std::sync::Arc;
use std::time::Duration;

use rag_application::status::StatusService;
use rag_domain::entities::{Chunk, PageEmbedding};
use rag_domain::error::Result;
use rag_domain::log_error;
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::ports::extract::{TextExtractor, VisualExtractor};
use rag_domain::ports::object_store::ObjectStore;
use rag_domain::ports::queue::Queue;
use rag_domain::ports::vector_store::{DocumentStore, PageEmbeddingStore, VectorStore};
use rag_domain::value_objects::{DocumentState, Lane};
use serde_json::Value as Json;
use uuid::Uuid;

use crate::indexing::Bm25Indexer;

/// How many messages a single `receive` call pulls at once.
const BATCH_SIZE: usize = 4;
/// Backoff when a lane queue comes back empty.
const IDLE_SLEEP: Duration = Duration::from_millis(500);

/// One inbound lane-queue message, as enqueued by the ingestion orchestrator.
#[derive(Debug, serde::Deserialize)]
struct LaneMessage {
    bucket: String,
    key: String,
    lane: Lane,
    mime: String,
    #[serde(default)]
    user: Option<String>,
    /// The per-document credential parcel fetched from the Secrets Broker
    /// at enqueue time, so this lane worker can call out on the
    /// uploader's behalf without a second broker round-trip.
    #[serde(default)]
    credentials: Json,
}

/// Runs one lane's consume-extract-embed-index loop until cancelled.
pub struct LaneWorker {
    lane: Lane,
    queue_url: String,
    queue: Arc<dyn Queue>,
    object_store: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    status: Arc<StatusService>,
    text_extractor: Arc<dyn TextExtractor>,
    visual_extractor: Arc<dyn VisualExtractor>,
    embedder: Arc<dyn EmbeddingApi>,
    vectors: Arc<dyn VectorStore>,
    pages: Arc<dyn PageEmbeddingStore>,
    bm25: Arc<Bm25Indexer>,
    embedding_model: String,
}

impl LaneWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lane: Lane,
        queue_url: impl Into<String>,
        queue: Arc<dyn Queue>,
        object_store: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        status: Arc<StatusService>,
        text_extractor: Arc<dyn TextExtractor>,
        visual_extractor: Arc<dyn VisualExtractor>,
        embedder: Arc<dyn EmbeddingApi>,
        vectors: Arc<dyn VectorStore>,
        pages: Arc<dyn PageEmbeddingStore>,
        bm25: Arc<Bm25Indexer>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            lane,
            queue_url: queue_url.into(),
            queue,
            object_store,
            documents,
            status,
            text_extractor,
            visual_extractor,
            embedder,
            vectors,
            pages,
            bm25,
            embedding_model: embedding_model.into(),
        }
    }

    /// Consume until the queue itself fails. A single message's processing
    /// failure never stops the loop — it's acked or returned to the queue
    /// depending on whether the error is retryable; only a failure in
    /// `receive`, `delete`, or `extend_visibility` (the queue connection
    /// itself) ends the loop, since the caller needs to know to restart
    /// the worker.
    pub async fn run(&self) -> Result<()> {
        loop {
            let messages = self.queue.receive(&self.queue_url, BATCH_SIZE).await?;
            if messages.is_empty() {
                tokio::time::sleep(IDLE_SLEEP).await;
                continue;
            }

            for message in messages {
                let receipt = message.receipt.clone();
                match self.handle(message.body).await {
                    Ok(()) => {
                        self.queue.delete(&self.queue_url, &receipt).await?;
                    }
                    Err(e) if e.is_retryable() => {
                        log_error!("lane_worker", &format!("retryable failure, returning to queue: {e}"));
                        self.queue.extend_visibility(&self.queue_url, &receipt, 0).await?;
                    }
                    Err(e) => {
                        log_error!("lane_worker", &format!("fatal failure, dropping message: {e}"));
                        self.queue.delete(&self.queue_url, &receipt).await?;
                    }
                }
            }
        }
    }

    async fn handle(&self, body: Json) -> Result<()> {
        let message: LaneMessage = serde_json::from_value(body)?;
        let document_id = format!("{}/{}", message.bucket, message.key);
        let user = message.user.as_deref().unwrap_or("unknown");
        tracing::debug!(
            document_id,
            has_credentials = !message.credentials.is_null(),
            "lane message received"
        );

        self.documents
            .create(&document_id, user, &message.bucket, &message.key, &message.mime, 0)
            .await?;
        self.documents.set_lane(&document_id, message.lane).await?;

        self.status
            .advance(&message.bucket, &message.key, DocumentState::ProcessingStarted, 5, None, Some(user))
            .await?;

        let bytes = self.object_store.get(&message.bucket, &message.key).await?;

        match self.lane {
            Lane::Text => self.process_text(&message, &document_id, &bytes).await?,
            Lane::Visual => self.process_visual(&message, &document_id, &bytes).await?,
        }

        self.documents.set_state(&document_id, DocumentState::Completed).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::Completed, 100, None, Some(user))
            .await?;
        Ok(())
    }

    async fn process_text(&self, message: &LaneMessage, document_id: &str, bytes: &[u8]) -> Result<()> {
        self.documents.set_state(document_id, DocumentState::ExtractingText).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::ExtractingText, 20, None, message.user.as_deref())
            .await?;

        let extracted = self.text_extractor.extract(&message.mime, bytes).await?;
        if extracted.is_empty() {
            return Ok(());
        }

        self.documents.set_state(document_id, DocumentState::Chunking).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::Chunking, 40, None, message.user.as_deref())
            .await?;

        let texts: Vec<String> = extracted.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&self.embedding_model, &texts).await?;

        self.documents.set_state(document_id, DocumentState::Embedding).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::Embedding, 70, None, message.user.as_deref())
            .await?;

        let mut chunks = Vec::with_capacity(extracted.len());
        for (ordinal, (piece, embedding)) in extracted.into_iter().zip(embeddings.into_iter()).enumerate() {
            let chunk = Chunk {
                id: Uuid::new_v4().to_string(),
                document_id: document_id.to_owned(),
                ordinal: ordinal as i64,
                content: piece.content,
                location: piece.location,
                embedding: Some(embedding),
                embedding_qa: None,
                metadata: serde_json::json!({}),
                updated_at: chrono::Utc::now(),
            };
            self.vectors.upsert_chunk(&chunk).await?;
            chunks.push(chunk);
        }

        self.documents.set_state(document_id, DocumentState::Storing).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::Storing, 90, None, message.user.as_deref())
            .await?;

        self.bm25.index_document(document_id, &chunks).await
    }

    async fn process_visual(&self, message: &LaneMessage, document_id: &str, bytes: &[u8]) -> Result<()> {
        self.documents.set_state(document_id, DocumentState::ConvertingPages).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::ConvertingPages, 20, None, message.user.as_deref())
            .await?;

        let pages = self.visual_extractor.render_pages(&message.mime, bytes).await?;
        if pages.is_empty() {
            return Ok(());
        }

        self.documents.set_state(document_id, DocumentState::EmbeddingPages).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::EmbeddingPages, 60, None, message.user.as_deref())
            .await?;

        for page in pages {
            let caption = page.alt_text.clone().unwrap_or_default();
            let vectors = self.embedder.embed_tokens(&self.embedding_model, &caption).await?;
            self.pages
                .upsert_page(&PageEmbedding {
                    document_id: document_id.to_owned(),
                    page: page.page,
                    vectors,
                    tokens_formula_a: page.tokens_formula_a,
                    tokens_formula_b: page.tokens_formula_b,
                })
                .await?;
        }

        self.documents.set_state(document_id, DocumentState::Storing).await?;
        self.status
            .advance(&message.bucket, &message.key, DocumentState::Storing, 90, None, message.user.as_deref())
            .await
            .map(|_| ())
    }
}
