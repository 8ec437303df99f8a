//! HTTP `EmbeddingApi` adapter (§6), consumed by C7 (dense embedding) and
//! C10's query path (per-token embeddings for MaxSim).

use async_trait::async_trait;
use rag_domain::error::{Error, Result};
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::value_objects::EmbeddingVector;
use serde::{Deserialize, Serialize};

fn upstream_err(e: reqwest::Error) -> Error {
    Error::upstream_with_source("embedding-api", e)
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    embedding: EmbeddingVector,
}

#[derive(Serialize)]
struct TokenEmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct TokenEmbedResponse {
    tokens: Vec<EmbeddingVector>,
}

/// HTTP client for the embedding service. Retries are the caller's
/// responsibility — every upstream error is surfaced as
/// [`rag_domain::error::Error::Upstream`], whose `is_retryable()` the
/// lane workers consult before backing off.
pub struct HttpEmbeddingApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpEmbeddingApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl EmbeddingApi for HttpEmbeddingApi {
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest { model, input: texts })
            .send()
            .await
            .map_err(upstream_err)?;

        if !response.status().is_success() {
            return Err(Error::upstream(format!(
                "embedding API returned {}",
                response.status()
            )));
        }
        let parsed: EmbedResponse = response.json().await.map_err(upstream_err)?;
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    async fn embed_tokens(&self, model: &str, text: &str) -> Result<Vec<EmbeddingVector>> {
        let response = self
            .client
            .post(format!("{}/embeddings/tokens", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&TokenEmbedRequest { model, input: text })
            .send()
            .await
            .map_err(upstream_err)?;

        if !response.status().is_success() {
            return Err(Error::upstream(format!(
                "embedding API returned {}",
                response.status()
            )));
        }
        let parsed: TokenEmbedResponse = response.json().await.map_err(upstream_err)?;
        Ok(parsed.tokens)
    }
}
