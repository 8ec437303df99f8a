//! BM25 Indexer (C8): turns extracted/embedded chunks into
//! [`ChunkBm25Row`]s and persists them through [`Bm25Store`]. Runs at
//! ingest time, right after C7 assigns each chunk its dense embedding.

use std::collections::HashMap;
use std::sync::Arc;

use rag_domain::entities::{Chunk, ChunkBm25Row};
use rag_domain::error::Result;
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::text::tokenize;

/// Builds one [`ChunkBm25Row`] per chunk and upserts them as a batch.
/// Term frequencies are counted from the tokenized content; reusing
/// [`rag_domain::text::tokenize`] here (rather than a local copy) is what
/// keeps these document frequencies consistent with the identical
/// tokenizer the hybrid retriever runs over the query side.
pub struct Bm25Indexer {
    store: Arc<dyn Bm25Store>,
}

impl Bm25Indexer {
    pub fn new(store: Arc<dyn Bm25Store>) -> Self {
        Self { store }
    }

    /// Index every chunk of a freshly-ingested document. Call once per
    /// document after embedding; never called per-chunk, since BM25
    /// document statistics (`avg_chunk_length`, `total_unique_terms`)
    /// are only meaningful computed over the whole batch at once.
    pub async fn index_document(&self, document_id: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let rows: Vec<ChunkBm25Row> = chunks.iter().map(|chunk| row_for(document_id, chunk)).collect();
        self.store.upsert_chunks(document_id, &rows).await
    }
}

fn row_for(document_id: &str, chunk: &Chunk) -> ChunkBm25Row {
    let terms = tokenize(&chunk.content);
    let mut term_freqs: HashMap<String, u32> = HashMap::new();
    for term in &terms {
        *term_freqs.entry(term.clone()).or_insert(0) += 1;
    }
    ChunkBm25Row {
        chunk_id: chunk.id.clone(),
        document_id: document_id.to_owned(),
        doc_length: terms.len() as u32,
        term_freqs,
        ordinal: chunk.ordinal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_domain::value_objects::ChunkLocation;

    fn chunk_with_ordinal(id: &str, ordinal: i64, content: &str) -> Chunk {
        Chunk {
            id: id.to_owned(),
            document_id: "doc-1".to_owned(),
            ordinal,
            content: content.to_owned(),
            location: ChunkLocation::default(),
            embedding: None,
            embedding_qa: None,
            metadata: serde_json::json!({}),
            updated_at: chrono::Utc::now(),
        }
    }

    fn chunk(id: &str, content: &str) -> Chunk {
        chunk_with_ordinal(id, 0, content)
    }

    #[test]
    fn counts_term_frequencies_and_length_from_the_shared_tokenizer() {
        let row = row_for("doc-1", &chunk("c1", "the quick quick fox"));
        assert_eq!(row.term_freqs.get("quick"), Some(&2));
        assert_eq!(row.term_freqs.get("fox"), Some(&1));
        assert!(!row.term_freqs.contains_key("the"));
        assert_eq!(row.doc_length, 3);
    }

    #[test]
    fn carries_the_chunks_ordinal_for_the_bm25_only_tie_break() {
        let row = row_for("doc-1", &chunk_with_ordinal("c1", 7, "some content"));
        assert_eq!(row.ordinal, 7);
    }
}
