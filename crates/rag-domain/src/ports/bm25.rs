//! BM25 Indexer (C8) persistence port. Scoring math lives in
//! `rag-infrastructure::bm25`; this port only covers the durable rows.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::entities::{ChunkBm25Row, DocumentBm25Meta};
use crate::error::Result;

/// Persistence for per-chunk term frequencies and document-level
/// aggregate BM25 statistics.
#[async_trait]
pub trait Bm25Store: Send + Sync {
    /// Upsert BM25 rows for a batch of chunks belonging to one document,
    /// merging into (not replacing) the document's existing term-document
    /// frequencies, then recompute `doc_bm25_meta` under one atomic update.
    async fn upsert_chunks(&self, document_id: &str, rows: &[ChunkBm25Row]) -> Result<()>;

    /// Replace BM25 rows for a specific subset of chunks (partial
    /// re-embedding, C12): old term contributions are subtracted from
    /// `doc_term_stats` before the new rows' terms are added, and
    /// `total_chunks` is left unchanged.
    async fn replace_chunks(&self, document_id: &str, rows: &[ChunkBm25Row]) -> Result<()>;

    /// Fetch the BM25 row for one chunk, if indexed.
    async fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkBm25Row>>;

    /// Fetch all BM25 rows for a document, for scoring.
    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<ChunkBm25Row>>;

    /// Fetch document-level aggregate stats.
    async fn meta_for_document(&self, document_id: &str) -> Result<Option<DocumentBm25Meta>>;

    /// Document-scoped term -> document-frequency map.
    async fn term_document_frequencies(
        &self,
        document_id: &str,
        terms: &[String],
    ) -> Result<HashMap<String, u32>>;

    /// Drop every BM25-owned row for a document in one transaction
    /// (chunk rows, term stats, and meta).
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// Drop BM25 rows for a specific subset of chunk ids, used by partial
    /// re-embedding before `replace_chunks` writes the new rows.
    async fn delete_chunks(&self, document_id: &str, chunk_ids: &[String]) -> Result<()>;
}
