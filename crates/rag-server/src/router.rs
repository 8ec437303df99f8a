//! Assembles every handler into one axum `Router`, with CORS and request
//! tracing layered the way the rest of the core logs (§ ambient stack).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use rag_infrastructure::AppContext;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{access, jobs, query, status};
use crate::ws;
use crate::AppState;

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let metrics_enabled = ctx.config.metrics.enabled;
    let state = AppState { ctx };

    let mut router = Router::new()
        .route("/v1/query", post(query::query))
        .route("/v1/status/{bucket}/{key}", get(status::get_status))
        .route("/v1/status/{bucket}/{key}/ws", get(ws::status_socket))
        .route("/v1/access/grant", post(access::grant))
        .route("/v1/access/simulate", post(access::simulate))
        .route("/v1/jobs/{document_id}/init", post(jobs::init))
        .route("/v1/jobs/{job_id}", get(jobs::get))
        .route("/v1/jobs/{job_id}/result", post(jobs::set_result))
        .route("/v1/jobs/{job_id}/stop", post(jobs::stop))
        .route("/v1/jobs/{document_id}/reindex", post(jobs::reindex));

    if metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics_handler() -> String {
    rag_infrastructure::metrics::export()
}
