//! Wire shapes for the HTTP/WebSocket surface. Kept separate from the
//! domain/application types so those crates never need to know about JSON
//! field casing or HTTP-specific optionality.

use rag_application::retrieval::{RankedResult, ScoredChunk, ScoredPage};
use rag_domain::entities::StatusRecord;
use rag_domain::value_objects::{DocumentState, ObjectType, Permission, PrincipalType};
use serde::{Deserialize, Serialize};

/// `POST /v1/query` request body. Carries both a `dataSources` scope list
/// and free-form `options`, generalizing §4.9's single-document scope to
/// the multi-document case (supplemented feature, see `SPEC_FULL.md`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    /// Document ids to scope the search to. Empty or absent searches
    /// every document the caller can read.
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub options: QueryOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Embedding model to query with; defaults to the server's configured
    /// default model when absent.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_w_dense")]
    pub w_dense: f32,
    #[serde(default = "default_w_sparse")]
    pub w_sparse: f32,
    #[serde(default)]
    pub use_rrf: bool,
    /// Include visual-lane pages via MaxSim alongside text chunks.
    #[serde(default)]
    pub include_pages: bool,
    #[serde(default)]
    pub w_page: f32,
    #[serde(default)]
    pub w_chunk: f32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            model: None,
            top_k: default_top_k(),
            w_dense: default_w_dense(),
            w_sparse: default_w_sparse(),
            use_rrf: false,
            include_pages: false,
            w_page: 0.5,
            w_chunk: 0.5,
        }
    }
}

fn default_top_k() -> usize {
    10
}
fn default_w_dense() -> f32 {
    0.5
}
fn default_w_sparse() -> f32 {
    0.5
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub hits: Vec<QueryHit>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryHit {
    Chunk {
        document_id: String,
        chunk_id: String,
        combined_score: f64,
        dense_score: f64,
        ordinal: i64,
    },
    Page {
        document_id: String,
        page: u32,
        score: f64,
    },
}

impl QueryHit {
    pub fn from_chunk(document_id: String, chunk: ScoredChunk) -> Self {
        Self::Chunk {
            document_id,
            chunk_id: chunk.chunk_id,
            combined_score: chunk.combined_score,
            dense_score: chunk.dense_score,
            ordinal: chunk.ordinal,
        }
    }

    pub fn from_page(page: ScoredPage) -> Self {
        Self::Page {
            document_id: page.document_id,
            page: page.page,
            score: page.score,
        }
    }

    pub fn from_ranked(document_id: String, ranked: RankedResult) -> Self {
        match ranked {
            RankedResult::Chunk(chunk) => Self::from_chunk(document_id, chunk),
            RankedResult::Page(page) => Self::from_page(page),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub bucket: String,
    pub key: String,
    pub state: DocumentState,
    pub progress: u8,
    pub error: Option<String>,
    pub pipeline: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<StatusRecord> for StatusResponse {
    fn from(record: StatusRecord) -> Self {
        Self {
            bucket: record.bucket,
            key: record.key,
            state: record.state,
            progress: record.progress,
            error: record.error,
            pipeline: record.pipeline,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub object: String,
    pub object_type: ObjectType,
    pub principals: Vec<GrantPrincipal>,
    pub level: Permission,
    #[serde(default)]
    pub policy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPrincipal {
    pub id: String,
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub objects: Vec<String>,
    pub principal: String,
    pub levels: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub matrix: Vec<Vec<bool>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResultRequest {
    pub result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexRequest {
    pub job_id: String,
    pub embedding_model: String,
    pub chunk_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexResponse {
    pub reembedded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_options_defaults_match_hybrid_search_defaults() {
        let options = QueryOptions::default();
        assert_eq!(options.top_k, 10);
        assert!((options.w_dense - 0.5).abs() < f32::EPSILON);
        assert!((options.w_sparse - 0.5).abs() < f32::EPSILON);
        assert!(!options.use_rrf);
        assert!(!options.include_pages);
        assert!(options.model.is_none());
    }

    #[test]
    fn query_request_defaults_data_sources_to_empty() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "what changed"}"#).unwrap();
        assert!(req.data_sources.is_empty());
        assert_eq!(req.options.top_k, 10);
    }

    #[test]
    fn query_hit_chunk_serializes_with_kind_tag() {
        let hit = QueryHit::from_chunk(
            "doc-1".to_owned(),
            ScoredChunk {
                chunk_id: "chunk-1".to_owned(),
                combined_score: 0.9,
                dense_score: 0.8,
                ordinal: 3,
            },
        );
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["kind"], "chunk");
        assert_eq!(json["documentId"], "doc-1");
        assert_eq!(json["chunkId"], "chunk-1");
    }
}
