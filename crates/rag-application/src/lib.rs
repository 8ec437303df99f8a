//! Application layer: use cases orchestrating `rag-domain` ports.
//!
//! Contains no I/O of its own — every external effect goes through a port
//! injected at construction time; adapters live in `rag-providers`.

pub mod ingestion;
pub mod jobs;
pub mod retrieval;
pub mod status;
