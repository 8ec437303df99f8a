//! Pure domain layer for the document-ingestion and hybrid-retrieval
//! core: entities, value objects, port traits, the error taxonomy, domain
//! events, and the classifier. No I/O; every suspension point is a trait
//! implemented in `rag-providers`.

pub mod classify;
pub mod constants;
pub mod entities;
pub mod error;
pub mod events;
mod macros;
pub mod ports;
pub mod text;
pub mod value_objects;

pub use macros::infra_log;

pub use classify::classify;
pub use error::{Error, Result};
