//! External provider port interfaces. Every suspension point named in
//! spec §5 (object-store reads, embedding calls, DB writes, queue sends,
//! WebSocket publishes) is expressed as a trait here; adapters live in
//! `rag-providers`.

pub mod access;
pub mod bm25;
pub mod embed;
pub mod events;
pub mod extract;
pub mod identity;
pub mod jobs;
pub mod metrics;
pub mod object_store;
pub mod queue;
pub mod secrets;
pub mod status;
pub mod vector_store;
