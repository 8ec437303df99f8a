//! Core entities (§3 of the spec). Each carries the identity and
//! invariants called out there; persistence concerns live in the
//! providers crate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::value_objects::{ChunkLocation, DocumentState, EmbeddingVector, JobState, Lane, ObjectType, Permission, PrincipalType};

/// An ingested document (§3 `Document`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Globally unique id.
    pub id: String,
    /// Owner principal (the uploader).
    pub owner: String,
    /// Opaque object-store bucket.
    pub storage_bucket: String,
    /// Opaque object-store key.
    pub storage_key: String,
    /// Lane chosen by the classifier (C3).
    pub lane: Lane,
    /// MIME type as reported by the object store.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
    /// Current lifecycle state.
    pub state: DocumentState,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A chunk of extracted content (§3 `Chunk`).
///
/// Invariant: `(document_id, ordinal)` is unique within storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique id, assigned by C7/C8 at write time.
    pub id: String,
    /// Parent document; cascade-deletes with it.
    pub document_id: String,
    /// Ordinal index among this document's chunks.
    pub ordinal: i64,
    /// Extracted text content.
    pub content: String,
    /// Structural location within the source document.
    pub location: ChunkLocation,
    /// Dense embedding, populated by C7. `None` before embedding runs.
    pub embedding: Option<EmbeddingVector>,
    /// Second ("QA-synthetic") embedding channel. Kept for schema
    /// compatibility; left empty unless a QA generator is reintroduced
    /// (open question, spec §9).
    pub embedding_qa: Option<EmbeddingVector>,
    /// Free-form per-chunk metadata.
    pub metadata: Json,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One page's token-patch matrix for a visual-lane document (§3 `PageEmbedding`).
///
/// Invariant: one row per `(document_id, page)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEmbedding {
    /// Parent document id.
    pub document_id: String,
    /// 1-based page number.
    pub page: u32,
    /// Patch embedding matrix, shape `[patches, dim]`.
    pub vectors: Vec<EmbeddingVector>,
    /// `ceil(w*h/750)` token-count estimate.
    pub tokens_formula_a: u32,
    /// `85 + 170*ceil(w/512)*ceil(h/512)` token-count estimate.
    pub tokens_formula_b: u32,
}

/// Per-chunk term-frequency row for BM25 (§3 `ChunkBM25Row`).
///
/// Invariant: keys are lowercased and stop-word-filtered; `doc_length >= 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkBm25Row {
    /// The chunk this row describes.
    pub chunk_id: String,
    /// Owning document, for cheap scoped deletes.
    pub document_id: String,
    /// term -> frequency within this chunk.
    pub term_freqs: HashMap<String, u32>,
    /// Token count of the chunk (sum of `term_freqs` values).
    pub doc_length: u32,
    /// The chunk's position within its document, copied from
    /// [`Chunk::ordinal`] at index time — the final tie-break key in
    /// §4.9's `combined_score → dense_score → ordinal` ordering.
    pub ordinal: i64,
}

/// Per-document, per-term chunk-document-frequency (§3 `DocumentTermStats`).
///
/// Invariant: monotonically non-decreasing as chunks are added; recomputed
/// from scratch on document delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTermStats {
    /// Owning document.
    pub document_id: String,
    /// term -> number of this document's chunks containing it.
    pub term_df: HashMap<String, u32>,
}

/// Document-level BM25 aggregate statistics (§3 `DocumentBM25Meta`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentBm25Meta {
    /// Owning document.
    pub document_id: String,
    /// Total chunk count.
    pub total_chunks: u32,
    /// Mean chunk token length across `total_chunks`.
    pub avg_chunk_length: f64,
    /// Distinct terms across all chunks.
    pub total_unique_terms: u32,
    /// Last update timestamp; updated atomically with the per-chunk writes.
    pub updated_at: DateTime<Utc>,
}

/// Durable lifecycle record for a single `(bucket, key)` (§3 `StatusRecord`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Object-store bucket.
    pub bucket: String,
    /// Object-store key.
    pub key: String,
    /// Current lifecycle state.
    pub state: DocumentState,
    /// Numeric progress, 0..=100.
    pub progress: u8,
    /// Error message, populated on `Failed`.
    pub error: Option<String>,
    /// Optional pipeline tag (e.g. lane name) for filtering.
    pub pipeline: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    /// `statusId` per spec §3: `(bucket, key)`.
    #[must_use]
    pub fn status_id(&self) -> (String, String) {
        (self.bucket.clone(), self.key.clone())
    }

    /// Whether this record has passed its 24h TTL relative to `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.updated_at) > chrono::Duration::hours(24)
    }
}

/// A grant of access from a principal to an object (§3 `AccessGrant`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    /// The object being granted access to.
    pub object_id: String,
    /// The principal receiving access.
    pub principal_id: String,
    /// Granted permission level.
    pub permission: Permission,
    /// Kind of principal.
    pub principal_type: PrincipalType,
    /// Kind of object.
    pub object_type: ObjectType,
    /// Free-form policy annotation (e.g. "default", "shared-link").
    pub policy: Option<String>,
}

/// An encrypted per-document credential parcel (§3 `SecretParcel`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretParcel {
    /// The document key the parcel is scoped to.
    pub document_key: String,
    /// Encrypted JSON blob (ciphertext, base64).
    pub ciphertext: String,
    /// Nonce used for the AES-GCM seal, base64.
    pub nonce: String,
    /// Creation timestamp, used by the daily sweep.
    pub created_at: DateTime<Utc>,
}

/// A long-running embedding job (§3 `EmbeddingJob`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingJob {
    /// Unique job id.
    pub job_id: String,
    /// Owning document.
    pub document_id: String,
    /// Principal that started the job.
    pub owner: String,
    /// Current state.
    pub state: JobState,
    /// Inline result, when small enough to store directly.
    pub result_inline: Option<Json>,
    /// Pointer to an object-store blob, when the result is too large to inline.
    pub result_blob: Option<(String, String)>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
