//! Embedding API external contract (§6) consumed by the Dense Embedder (C7)
//! and the MaxSim Retriever's query path (C10).

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::EmbeddingVector;

/// Batched text-embedding + per-query token-embedding API.
#[async_trait]
pub trait EmbeddingApi: Send + Sync {
    /// Embed each of `texts` with `model`, preserving order.
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    /// Embed `text` into a token-embedding matrix (visual lane's query
    /// path, for MaxSim scoring against page patches).
    async fn embed_tokens(&self, model: &str, text: &str) -> Result<Vec<EmbeddingVector>>;
}
