//! Concrete adapters implementing the `rag-domain` ports: Postgres +
//! pgvector persistence, Redis Streams queue, S3-compatible object
//! store, an HTTP embedding client, JWKS identity verification,
//! format-aware text extractors, the visual page-rendering extractor,
//! and AES-GCM secrets encryption.

pub mod embedding;
pub mod identity;
pub mod object_store;
pub mod persistence;
pub mod queue;
pub mod status_ws;
pub mod text_extract;
pub mod visual_extract;
