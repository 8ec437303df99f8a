//! Dual-retrieval query endpoint: generalizes C9/C10's single-document
//! scope to an explicit `dataSources` list (supplemented feature, see
//! `SPEC_FULL.md`), fanning the per-document search out and merging by
//! score. An absent/empty `dataSources` falls back to every document the
//! caller holds at least read on, via `AccessControl::objects_for_principal`.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use rag_application::retrieval::hybrid::{hybrid_search, HybridSearchParams};
use rag_application::retrieval::maxsim::hybrid_maxsim_search;
use rag_domain::value_objects::{FusionStrategy, Permission};

use crate::auth::AuthUser;
use crate::dto::{QueryHit, QueryRequest, QueryResponse};
use crate::error::HttpError;
use crate::AppState;

pub async fn query(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HttpError> {
    let started = Instant::now();
    let result = query_inner(&state, &user, &req).await;
    state.ctx.metrics.record_stage_latency(
        if req.options.include_pages { "maxsim_retriever" } else { "hybrid_retriever" },
        started.elapsed(),
        result.is_ok(),
    );
    result
}

async fn query_inner(
    state: &AppState,
    user: &rag_domain::ports::identity::BearerClaims,
    req: &QueryRequest,
) -> Result<Json<QueryResponse>, HttpError> {
    let data_sources = if req.data_sources.is_empty() {
        state
            .ctx
            .access
            .objects_for_principal(&user.user_id, Permission::Read)
            .await?
    } else {
        req.data_sources.clone()
    };
    if data_sources.is_empty() {
        return Ok(Json(QueryResponse { hits: Vec::new() }));
    }

    let embedding_model = req
        .options
        .model
        .clone()
        .unwrap_or_else(|| state.ctx.config.embedding.default_model.clone());
    let top_k = req.options.top_k;
    let fusion = if req.options.use_rrf {
        FusionStrategy::Rrf
    } else {
        FusionStrategy::Weighted {
            w_dense: req.options.w_dense,
            w_sparse: req.options.w_sparse,
        }
    };

    let mut hits: Vec<(f64, QueryHit)> = Vec::new();

    for document_id in &data_sources {
        if !state
            .ctx
            .access
            .check(document_id, &user.user_id, Permission::Read)
            .await?
        {
            continue;
        }

        if req.options.include_pages {
            let ranked = hybrid_maxsim_search(
                document_id,
                &req.query,
                &embedding_model,
                top_k,
                req.options.w_page as f64,
                req.options.w_chunk as f64,
                &state.ctx.embedder,
                &state.ctx.pages,
                &state.ctx.vectors,
                &state.ctx.bm25,
            )
            .await?;

            hits.extend(ranked.into_iter().map(|result| {
                let score = match &result {
                    rag_application::retrieval::RankedResult::Chunk(chunk) => chunk.combined_score,
                    rag_application::retrieval::RankedResult::Page(page) => page.score,
                };
                (score, QueryHit::from_ranked(document_id.clone(), result))
            }));
        } else {
            let scored = hybrid_search(
                &HybridSearchParams {
                    query: req.query.clone(),
                    document_id: document_id.clone(),
                    top_k,
                    embedding_model: embedding_model.clone(),
                    fusion,
                },
                &state.ctx.embedder,
                &state.ctx.vectors,
                &state.ctx.bm25,
            )
            .await?;

            hits.extend(
                scored
                    .into_iter()
                    .map(|chunk| (chunk.combined_score, QueryHit::from_chunk(document_id.clone(), chunk))),
            );
        }
    }

    hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(top_k);

    Ok(Json(QueryResponse {
        hits: hits.into_iter().map(|(_, hit)| hit).collect(),
    }))
}
