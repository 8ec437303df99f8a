//! Embedding Job Ledger operator surface (C12, §4.12): init/result/stop
//! and the partial re-embedding use case.

use axum::extract::{Path, State};
use axum::Json;
use rag_domain::value_objects::Permission;

use crate::auth::AuthUser;
use crate::dto::{ReindexRequest, ReindexResponse, SetResultRequest};
use crate::error::HttpError;
use crate::AppState;

pub async fn init(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(document_id): Path<String>,
) -> Result<Json<String>, HttpError> {
    if !state
        .ctx
        .access
        .check(&document_id, &user.user_id, Permission::Write)
        .await?
    {
        return Err(rag_domain::error::Error::forbidden(format!(
            "{} may not write {document_id}",
            user.user_id
        ))
        .into());
    }

    let job_id = state.ctx.jobs.init(&user.user_id, &document_id).await?;
    Ok(Json(job_id))
}

pub async fn set_result(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
    Json(req): Json<SetResultRequest>,
) -> Result<Json<()>, HttpError> {
    state
        .ctx
        .jobs
        .set_result(&user.user_id, &job_id, &req.result)
        .await?;
    Ok(Json(()))
}

pub async fn stop(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<()>, HttpError> {
    state.ctx.jobs.stop(&user.user_id, &job_id).await?;
    Ok(Json(()))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<rag_domain::entities::EmbeddingJob>, HttpError> {
    let job = state.ctx.jobs.get(&user.user_id, &job_id).await?;
    Ok(Json(job))
}

pub async fn reindex(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(document_id): Path<String>,
    Json(req): Json<ReindexRequest>,
) -> Result<Json<ReindexResponse>, HttpError> {
    if !state
        .ctx
        .access
        .check(&document_id, &user.user_id, Permission::Write)
        .await?
    {
        return Err(rag_domain::error::Error::forbidden(format!(
            "{} may not write {document_id}",
            user.user_id
        ))
        .into());
    }

    let reembedded = state
        .ctx
        .jobs
        .reindex_subset(
            &user.user_id,
            &req.job_id,
            &document_id,
            &req.embedding_model,
            &req.chunk_ids,
        )
        .await?;

    Ok(Json(ReindexResponse { reembedded }))
}
