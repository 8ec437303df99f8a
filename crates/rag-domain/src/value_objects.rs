//! Immutable value objects shared across entities and ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ingestion lane a document was routed through (C3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Format-aware text chunking + dense/BM25 indexing.
    Text,
    /// Page-image rendering + late-interaction patch embeddings.
    Visual,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Visual => write!(f, "visual"),
        }
    }
}

/// Permission level ordering for access control (C1): `read < write < owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// May read the object and its dependents.
    Read,
    /// May read and mutate the object.
    Write,
    /// May read, mutate, and grant access to others.
    Owner,
}

/// The kind of principal a grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    /// A human user.
    User,
    /// A service account / automation.
    Service,
    /// A group of principals.
    Group,
}

/// The kind of object an access grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A `Document`.
    Document,
    /// A `Chunk`.
    Chunk,
}

/// Structural location of a chunk within its source document. Fields are
/// populated per format by the text extractor (C5) and left `None` where
/// the format doesn't carry that notion of location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkLocation {
    /// 1-based page number (PDF).
    pub page: Option<u32>,
    /// Rising section counter (DOCX headings).
    pub section: Option<u32>,
    /// Sheet ordinal (XLSX).
    pub sheet_number: Option<u32>,
    /// Sheet name (XLSX).
    pub sheet_name: Option<String>,
    /// 1-based row number within a sheet (XLSX).
    pub row_number: Option<u32>,
    /// Character offset of the chunk's start in the normalized source text.
    pub nchar_index: Option<usize>,
}

/// A fixed-dimension dense embedding vector.
pub type EmbeddingVector = Vec<f32>;

/// Lifecycle state of a document, in the order defined by spec §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    Uploaded,
    Validating,
    Queued,
    ProcessingStarted,
    ConvertingPages,
    ExtractingText,
    ProcessingVisuals,
    ClassifyingVisuals,
    Chunking,
    Embedding,
    EmbeddingPages,
    Storing,
    Completed,
    Failed,
    Cancelled,
}

impl DocumentState {
    /// Numeric ordering used to detect regression; terminal states sort
    /// highest. Not used for equality — only for monotonic-progress
    /// sanity checks alongside the explicit `progress` percentage.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Uploaded => 0,
            Self::Validating => 1,
            Self::Queued => 2,
            Self::ProcessingStarted => 3,
            Self::ConvertingPages | Self::ExtractingText => 4,
            Self::ProcessingVisuals => 5,
            Self::ClassifyingVisuals => 6,
            Self::Chunking => 7,
            Self::Embedding => 8,
            Self::EmbeddingPages => 9,
            Self::Storing => 10,
            Self::Completed => 11,
            Self::Failed | Self::Cancelled => 12,
        }
    }

    /// Whether this is a terminal failure state.
    #[must_use]
    pub const fn is_terminal_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    /// Whether this state represents successful completion.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// State of a long-running embedding job (C12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Finished,
    Stopped,
    Failed,
}

impl JobState {
    /// Whether a worker observing this state should exit cooperatively.
    #[must_use]
    pub const fn is_stop_requested(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Fusion strategy for the hybrid retriever (C9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionStrategy {
    /// `w_dense * normalized_dense + w_sparse * normalized_sparse`.
    Weighted {
        /// Weight applied to the normalized dense score.
        w_dense: f32,
        /// Weight applied to the normalized sparse score.
        w_sparse: f32,
    },
    /// Reciprocal Rank Fusion, constant `k = 60`.
    Rrf,
}

/// RRF constant from the GLOSSARY.
pub const RRF_K: f64 = 60.0;

/// BM25 parameters from spec §4.9.
pub const BM25_K1: f64 = 1.5;
/// BM25 length-normalization parameter.
pub const BM25_B: f64 = 0.75;
