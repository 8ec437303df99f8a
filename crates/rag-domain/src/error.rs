//! Error taxonomy for the ingestion/retrieval core.
//!
//! Variants map directly onto the error taxonomy: auth/forbidden/not-found
//! are never retried, upstream errors are retried at the lane boundary by
//! the caller, fatal errors move a single document to `failed` without
//! touching the rest of the batch.

use thiserror::Error;

/// Result type alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ingestion/retrieval pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid bearer token, or an unknown principal. Never retried.
    #[error("authentication error: {message}")]
    Authentication {
        /// Description of the failure.
        message: String,
    },

    /// Access check failed. Never retried.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of the failure.
        message: String,
    },

    /// Unknown document/chunk/job/object.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that could not be located.
        resource: String,
    },

    /// Malformed input or schema violation.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the violation.
        message: String,
    },

    /// Object store, embedding API, or queue call failed. Retried with
    /// backoff at the lane boundary by returning the message to visibility.
    #[error("upstream error ({system}): {message}")]
    Upstream {
        /// Which external system failed (`object_store`, `embedding`, `queue`, ...).
        system: String,
        /// Description of the failure.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Index rows are inconsistent (e.g. a chunk without a BM25 row).
    /// Surfaced to the operator; never crashes a worker.
    #[error("corruption detected: {message}")]
    Corruption {
        /// Description of the inconsistency.
        message: String,
    },

    /// Unrecoverable per-document failure (e.g. source bytes unreadable,
    /// credentials missing). The document transitions to `failed`; the
    /// batch continues.
    #[error("fatal error processing document {document_id}: {message}")]
    Fatal {
        /// The document that failed.
        document_id: String,
        /// Stage at which the failure occurred.
        stage: String,
        /// Description of the failure.
        message: String,
    },

    /// Database-layer error not otherwise classified.
    #[error("database error: {message}")]
    Database {
        /// Description of the failure.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal invariant violation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    /// JSON (de)serialization error.
    #[error("json error: {source}")]
    Json {
        /// The underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Build an [`Error::Authentication`].
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Build an [`Error::Forbidden`].
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Build an [`Error::NotFound`].
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Build an [`Error::Validation`].
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build an [`Error::Upstream`] with no source.
    pub fn upstream<S: Into<String>, M: Into<String>>(system: S, message: M) -> Self {
        Self::Upstream {
            system: system.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build an [`Error::Upstream`] carrying the original error, using its
    /// `Display` output as the message.
    pub fn upstream_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        system: S,
        source: E,
    ) -> Self {
        Self::Upstream {
            system: system.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an [`Error::Corruption`].
    pub fn corruption<S: Into<String>>(message: S) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Build an [`Error::Fatal`] for a specific document and stage.
    pub fn fatal<D: Into<String>, S: Into<String>, M: Into<String>>(
        document_id: D,
        stage: S,
        message: M,
    ) -> Self {
        Self::Fatal {
            document_id: document_id.into(),
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Build an [`Error::Database`] with no source.
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Build an [`Error::Database`] carrying the original error.
    pub fn database_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an [`Error::Internal`].
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether a worker may retry the operation that produced this error
    /// by returning the queue message to visibility.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
