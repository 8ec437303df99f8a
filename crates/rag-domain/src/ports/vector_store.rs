//! Dense vector persistence port, backing the Dense Embedder (C7) and the
//! dense leg of the Hybrid Retriever (C9), plus the visual lane's
//! page-patch store used by the MaxSim Retriever (C10).

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::entities::{Chunk, PageEmbedding};
use crate::error::Result;
use crate::value_objects::EmbeddingVector;

/// A chunk candidate returned from a dense similarity search.
#[derive(Debug, Clone)]
pub struct DenseHit {
    /// The matched chunk id.
    pub chunk_id: String,
    /// Inner-product / cosine similarity score.
    pub score: f64,
    /// Ordinal of the chunk within its document, for tie-breaking.
    pub ordinal: i64,
}

/// Persistence for chunks' dense embeddings. `upsert` maintains the GIN
/// full-text index on `content` and the two ANN indexes (direct and
/// QA-synthetic channel) described in spec §4.7.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert a chunk on conflict of `id`, updating content, embedding,
    /// location, ordinal, metadata, and bumping `updated_at`.
    async fn upsert_chunk(&self, chunk: &Chunk) -> Result<()>;

    /// Fetch a chunk by id.
    async fn get_chunk(&self, chunk_id: &str) -> Result<Option<Chunk>>;

    /// Top-`limit` chunks by similarity to `query`, scoped to `document_id`.
    async fn search(
        &self,
        document_id: &str,
        query: &EmbeddingVector,
        limit: usize,
    ) -> Result<Vec<DenseHit>>;

    /// Delete specific chunks and their embeddings.
    async fn delete_chunks(&self, document_id: &str, chunk_ids: &[String]) -> Result<()>;

    /// Delete every chunk owned by `document_id`.
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// All chunks owned by a document, for BM25 re-derivation / operator tools.
    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<Chunk>>;
}

/// Persistence for visual-lane page-patch embeddings (C6 writes, C10 reads).
#[async_trait]
pub trait PageEmbeddingStore: Send + Sync {
    /// Upsert one page's patch matrix.
    async fn upsert_page(&self, page: &PageEmbedding) -> Result<()>;

    /// Fetch every page for a document.
    async fn pages_for_document(&self, document_id: &str) -> Result<Vec<PageEmbedding>>;

    /// Delete every page owned by a document.
    async fn delete_document(&self, document_id: &str) -> Result<()>;
}

/// Minimal document metadata/state store, shared by every component that
/// needs to read or mutate a `Document` row.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document row.
    async fn create(
        &self,
        id: &str,
        owner: &str,
        bucket: &str,
        key: &str,
        mime: &str,
        size: u64,
    ) -> Result<()>;

    /// Fetch a document by id.
    async fn get(&self, id: &str) -> Result<Option<crate::entities::Document>>;

    /// Update the classification lane once C3 has decided.
    async fn set_lane(&self, id: &str, lane: crate::value_objects::Lane) -> Result<()>;

    /// Update lifecycle state.
    async fn set_state(&self, id: &str, state: crate::value_objects::DocumentState) -> Result<()>;

    /// Delete a document and (transactionally, at the adapter level) every
    /// row it owns across chunks, page_embeddings, chunk_bm25,
    /// doc_term_stats, and doc_bm25_meta.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Arbitrary metadata recorded at upload time (used by the classifier's
    /// "scanned" hint and `force_reprocess`).
    async fn metadata(&self, id: &str) -> Result<Json>;
}
