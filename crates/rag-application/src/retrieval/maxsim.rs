//! MaxSim Retriever (C10): late-interaction scoring over visual-lane page
//! patch embeddings, plus the hybrid VDR+text variant (§4.10).

use std::sync::Arc;

use rag_domain::entities::PageEmbedding;
use rag_domain::error::Result;
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::ports::vector_store::PageEmbeddingStore;
use rag_domain::value_objects::EmbeddingVector;

use crate::retrieval::hybrid::{hybrid_search, HybridSearchParams, ScoredChunk};
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::ports::vector_store::VectorStore;

/// One scored page, from MaxSim late-interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPage {
    pub document_id: String,
    pub page: u32,
    pub score: f64,
}

/// A ranked hit from either lane, discriminated by `kind` so callers can
/// rehydrate a chunk or a page image (§4.10 hybrid variant).
#[derive(Debug, Clone)]
pub enum RankedResult {
    Chunk(ScoredChunk),
    Page(ScoredPage),
}

/// MaxSim late-interaction score: `sum_i max_j Q_i . D_j^T`.
#[must_use]
pub fn maxsim_score(query: &[EmbeddingVector], patches: &[EmbeddingVector]) -> f64 {
    if patches.is_empty() {
        return 0.0;
    }
    query
        .iter()
        .map(|q| {
            patches
                .iter()
                .map(|d| dot(q, d))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .sum()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

/// Run MaxSim search over every page of `document_id`, returning the
/// top-`k` pages by late-interaction score. Pages collapse to documents
/// by taking the max score across their own pages when a caller scores
/// multiple documents and reduces afterward — this function is
/// single-document scoped per the page store contract.
pub async fn maxsim_search(
    document_id: &str,
    query: &str,
    embedding_model: &str,
    top_k: usize,
    embedder: &Arc<dyn EmbeddingApi>,
    pages: &Arc<dyn PageEmbeddingStore>,
) -> Result<Vec<ScoredPage>> {
    let query_tokens = embedder.embed_tokens(embedding_model, query).await?;
    if query_tokens.is_empty() {
        return Ok(Vec::new());
    }

    let page_rows: Vec<PageEmbedding> = pages.pages_for_document(document_id).await?;
    let mut scored: Vec<ScoredPage> = page_rows
        .iter()
        .map(|row| ScoredPage {
            document_id: document_id.to_owned(),
            page: row.page,
            score: maxsim_score(&query_tokens, &row.vectors),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    Ok(scored)
}

/// Hybrid VDR+text variant (§4.10): run MaxSim page search and C9 chunk
/// search, then combine with per-channel weights into a single ranked
/// list carrying a `(kind, score)` discriminator.
#[allow(clippy::too_many_arguments)]
pub async fn hybrid_maxsim_search(
    document_id: &str,
    query: &str,
    embedding_model: &str,
    top_k: usize,
    w_page: f64,
    w_chunk: f64,
    embedder: &Arc<dyn EmbeddingApi>,
    pages: &Arc<dyn PageEmbeddingStore>,
    vectors: &Arc<dyn VectorStore>,
    bm25: &Arc<dyn Bm25Store>,
) -> Result<Vec<RankedResult>> {
    let page_hits = maxsim_search(
        document_id,
        query,
        embedding_model,
        top_k,
        embedder,
        pages,
    )
    .await?;

    let chunk_hits = hybrid_search(
        &HybridSearchParams {
            query: query.to_owned(),
            document_id: document_id.to_owned(),
            top_k,
            embedding_model: embedding_model.to_owned(),
            fusion: rag_domain::value_objects::FusionStrategy::Rrf,
        },
        embedder,
        vectors,
        bm25,
    )
    .await?;

    let page_max = page_hits.iter().map(|p| p.score).fold(0.0_f64, f64::max).max(1e-9);
    let chunk_max = chunk_hits
        .iter()
        .map(|c| c.combined_score)
        .fold(0.0_f64, f64::max)
        .max(1e-9);

    let mut combined: Vec<(f64, RankedResult)> = page_hits
        .into_iter()
        .map(|p| {
            let normalized = p.score / page_max;
            (w_page * normalized, RankedResult::Page(p))
        })
        .chain(chunk_hits.into_iter().map(|c| {
            let normalized = c.combined_score / chunk_max;
            (w_chunk * normalized, RankedResult::Chunk(c))
        }))
        .collect();

    combined.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    combined.truncate(top_k);
    Ok(combined.into_iter().map(|(_, result)| result).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maxsim_sums_per_query_token_maxima() {
        let query = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let patches = vec![vec![1.0, 0.0], vec![0.0, 0.5]];
        // token 0 maxes against patch 0 (dot=1.0), token 1 maxes against patch 1 (dot=0.5)
        let score = maxsim_score(&query, &patches);
        assert!((score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn maxsim_is_zero_with_no_patches() {
        let query = vec![vec![1.0, 0.0]];
        let score = maxsim_score(&query, &[]);
        assert_eq!(score, 0.0);
    }
}
