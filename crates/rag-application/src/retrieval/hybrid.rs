//! Hybrid Retriever (C9): dense + BM25 fusion, weighted or RRF (§4.9).

use std::collections::HashMap;
use std::sync::Arc;

use rag_domain::error::Result;
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::ports::vector_store::VectorStore;
use rag_domain::value_objects::{FusionStrategy, BM25_B, BM25_K1, RRF_K};

/// Parameters for one hybrid search call.
#[derive(Debug, Clone)]
pub struct HybridSearchParams {
    pub query: String,
    pub document_id: String,
    pub top_k: usize,
    pub embedding_model: String,
    pub fusion: FusionStrategy,
}

/// One fused hit, ready for the caller to rehydrate the chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub combined_score: f64,
    pub dense_score: f64,
    pub ordinal: i64,
}

/// Ranked candidate from one of the two legs, before fusion.
struct RankedHit {
    chunk_id: String,
    score: f64,
    ordinal: i64,
}

/// Run the hybrid search described in §4.9: embed the query once, search
/// dense and BM25 independently for the top `2*top_k` each, fuse, dedupe,
/// and truncate. Empty corpora return `[]`, never an error.
pub async fn hybrid_search(
    params: &HybridSearchParams,
    embedder: &Arc<dyn EmbeddingApi>,
    vectors: &Arc<dyn VectorStore>,
    bm25: &Arc<dyn Bm25Store>,
) -> Result<Vec<ScoredChunk>> {
    let fetch_limit = params.top_k.saturating_mul(2).max(1);

    let query_vectors = embedder
        .embed(&params.embedding_model, std::slice::from_ref(&params.query))
        .await?;
    let Some(query_embedding) = query_vectors.into_iter().next() else {
        return Ok(Vec::new());
    };

    let dense_hits = vectors
        .search(&params.document_id, &query_embedding, fetch_limit)
        .await?;
    let dense_ranked: Vec<RankedHit> = dense_hits
        .into_iter()
        .map(|hit| RankedHit {
            chunk_id: hit.chunk_id,
            score: hit.score,
            ordinal: hit.ordinal,
        })
        .collect();

    let sparse_ranked = bm25_search(&params.query, &params.document_id, fetch_limit, bm25).await?;

    if dense_ranked.is_empty() && sparse_ranked.is_empty() {
        return Ok(Vec::new());
    }

    let mut fused = fuse(&dense_ranked, &sparse_ranked, params.fusion);
    fused.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.dense_score.partial_cmp(&a.dense_score).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| a.ordinal.cmp(&b.ordinal))
    });
    fused.truncate(params.top_k);
    Ok(fused)
}

/// BM25 leg of the search: `idf = log((N - df + 0.5) / (df + 0.5))` with
/// document-scoped `N`, Okapi BM25 saturation with `k1=1.5, b=0.75`.
async fn bm25_search(
    query: &str,
    document_id: &str,
    limit: usize,
    bm25: &Arc<dyn Bm25Store>,
) -> Result<Vec<RankedHit>> {
    let Some(meta) = bm25.meta_for_document(document_id).await? else {
        return Ok(Vec::new());
    };
    if meta.total_chunks == 0 {
        return Ok(Vec::new());
    }

    let terms = rag_domain::text::tokenize(query);
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let dfs = bm25.term_document_frequencies(document_id, &terms).await?;
    let n = f64::from(meta.total_chunks);
    let idfs: HashMap<&str, f64> = terms
        .iter()
        .map(|term| {
            let df = f64::from(*dfs.get(term).unwrap_or(&0));
            let idf = ((n - df + 0.5) / (df + 0.5)).ln();
            (term.as_str(), idf)
        })
        .collect();

    let rows = bm25.chunks_for_document(document_id).await?;
    let avg_len = meta.avg_chunk_length.max(1e-9);

    let mut scored: Vec<RankedHit> = rows
        .into_iter()
        .filter_map(|row| {
            let mut score = 0.0_f64;
            for term in &terms {
                let tf = f64::from(*row.term_freqs.get(term).unwrap_or(&0));
                if tf == 0.0 {
                    continue;
                }
                let idf = *idfs.get(term.as_str()).unwrap_or(&0.0);
                let denom = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * f64::from(row.doc_length) / avg_len);
                score += idf * (tf * (BM25_K1 + 1.0)) / denom;
            }
            if score <= 0.0 {
                return None;
            }
            Some(RankedHit {
                chunk_id: row.chunk_id,
                score,
                ordinal: row.ordinal,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    Ok(scored)
}

/// Fuse two ranked legs per §4.9: weighted max-normalized sum, or RRF.
fn fuse(dense: &[RankedHit], sparse: &[RankedHit], strategy: FusionStrategy) -> Vec<ScoredChunk> {
    let dense_scores: HashMap<&str, (f64, i64)> = dense
        .iter()
        .map(|h| (h.chunk_id.as_str(), (h.score, h.ordinal)))
        .collect();

    match strategy {
        FusionStrategy::Weighted { w_dense, w_sparse } => {
            let dense_max = dense.iter().map(|h| h.score).fold(0.0_f64, f64::max).max(1e-9);
            let sparse_max = sparse.iter().map(|h| h.score).fold(0.0_f64, f64::max).max(1e-9);

            let mut by_chunk: HashMap<String, (f64, f64, i64)> = HashMap::new();
            for hit in dense {
                let normalized = hit.score / dense_max;
                by_chunk.insert(hit.chunk_id.clone(), (normalized, 0.0, hit.ordinal));
            }
            for hit in sparse {
                let normalized = hit.score / sparse_max;
                by_chunk
                    .entry(hit.chunk_id.clone())
                    .and_modify(|(_, s, _)| *s = normalized)
                    .or_insert((0.0, normalized, 0));
            }

            by_chunk
                .into_iter()
                .map(|(chunk_id, (d, s, ordinal))| {
                    let dense_score = dense_scores.get(chunk_id.as_str()).map_or(0.0, |(score, _)| *score);
                    ScoredChunk {
                        chunk_id,
                        combined_score: f64::from(w_dense) * d + f64::from(w_sparse) * s,
                        dense_score,
                        ordinal,
                    }
                })
                .collect()
        }
        FusionStrategy::Rrf => {
            let mut by_chunk: HashMap<String, (f64, i64)> = HashMap::new();
            for (rank, hit) in dense.iter().enumerate() {
                let contribution = 1.0 / (RRF_K + (rank + 1) as f64);
                by_chunk.insert(hit.chunk_id.clone(), (contribution, hit.ordinal));
            }
            for (rank, hit) in sparse.iter().enumerate() {
                let contribution = 1.0 / (RRF_K + (rank + 1) as f64);
                by_chunk
                    .entry(hit.chunk_id.clone())
                    .and_modify(|(score, _)| *score += contribution)
                    .or_insert((contribution, 0));
            }

            by_chunk
                .into_iter()
                .map(|(chunk_id, (combined_score, ordinal))| {
                    let dense_score = dense_scores.get(chunk_id.as_str()).map_or(0.0, |(score, _)| *score);
                    ScoredChunk {
                        chunk_id,
                        combined_score,
                        dense_score,
                        ordinal,
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f64, ordinal: i64) -> RankedHit {
        RankedHit {
            chunk_id: id.to_owned(),
            score,
            ordinal,
        }
    }

    #[test]
    fn rrf_is_symmetric_in_its_two_lists() {
        let a = vec![hit("x", 0.9, 0), hit("y", 0.5, 1)];
        let b = vec![hit("y", 12.0, 1), hit("z", 3.0, 2)];

        let mut fused_ab = fuse(&a, &b, FusionStrategy::Rrf);
        let mut fused_ba = fuse(&b, &a, FusionStrategy::Rrf);

        fused_ab.sort_by(|l, r| l.chunk_id.cmp(&r.chunk_id));
        fused_ba.sort_by(|l, r| l.chunk_id.cmp(&r.chunk_id));

        for (l, r) in fused_ab.iter().zip(fused_ba.iter()) {
            assert_eq!(l.chunk_id, r.chunk_id);
            assert!((l.combined_score - r.combined_score).abs() < 1e-12);
        }
    }

    #[test]
    fn weighted_fusion_normalizes_by_max_score() {
        let dense = vec![hit("a", 0.8, 0), hit("b", 0.4, 1)];
        let sparse = vec![hit("a", 5.0, 0)];

        let fused = fuse(
            &dense,
            &sparse,
            FusionStrategy::Weighted {
                w_dense: 0.5,
                w_sparse: 0.5,
            },
        );

        let a = fused.iter().find(|c| c.chunk_id == "a").unwrap();
        // dense normalized 0.8/0.8=1.0, sparse normalized 5.0/5.0=1.0
        assert!((a.combined_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rrf_fusion_snapshot_is_stable_for_a_fixed_input() {
        let dense = vec![hit("a", 0.9, 0), hit("b", 0.5, 1), hit("c", 0.2, 2)];
        let sparse = vec![hit("b", 8.0, 1), hit("d", 1.0, 3)];

        let mut fused = fuse(&dense, &sparse, FusionStrategy::Rrf);
        fused.sort_by(|l, r| l.chunk_id.cmp(&r.chunk_id));

        insta::assert_debug_snapshot!(fused);
    }

    proptest::proptest! {
        #[test]
        fn rrf_contribution_is_always_positive_and_bounded(
            dense_ranks in proptest::collection::vec(0usize..50, 0..20),
            sparse_ranks in proptest::collection::vec(0usize..50, 0..20),
        ) {
            let dense: Vec<RankedHit> = dense_ranks
                .iter()
                .enumerate()
                .map(|(i, _)| hit(&format!("d{i}"), 1.0, i as i64))
                .collect();
            let sparse: Vec<RankedHit> = sparse_ranks
                .iter()
                .enumerate()
                .map(|(i, _)| hit(&format!("s{i}"), 1.0, i as i64))
                .collect();

            let fused = fuse(&dense, &sparse, FusionStrategy::Rrf);
            for chunk in &fused {
                prop_assert!(chunk.combined_score > 0.0);
                prop_assert!(chunk.combined_score <= 2.0 / (RRF_K + 1.0));
            }
        }

        #[test]
        fn a_chunk_present_in_both_legs_never_scores_below_either_leg_alone(
            rank in 0usize..50,
        ) {
            let dense = vec![hit("shared", 1.0, rank as i64)];
            let sparse = vec![hit("shared", 1.0, rank as i64)];

            let dense_only = fuse(&dense, &[], FusionStrategy::Rrf);
            let both = fuse(&dense, &sparse, FusionStrategy::Rrf);

            let dense_only_score = dense_only[0].combined_score;
            let both_score = both[0].combined_score;
            prop_assert!(both_score >= dense_only_score);
        }
    }
}
