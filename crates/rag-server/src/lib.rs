//! HTTP + WebSocket front door for the ingestion/retrieval core: status
//! fan-out, hybrid/MaxSim query endpoints, access-control and job-ledger
//! operator routes. `ragctl` (in `src/bin/ragctl.rs`) talks to the same
//! [`AppContext`] services directly rather than over HTTP.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod ingest_worker;
pub mod router;
pub mod ws;

use std::sync::Arc;

use rag_infrastructure::AppContext;

/// Shared axum router state: one `Arc` clone per request.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
}

pub use router::build_router;
