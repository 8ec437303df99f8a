//! Object Access Control operator surface (C1, §4.1): grant, simulate.

use axum::extract::State;
use axum::Json;

use crate::auth::AuthUser;
use crate::dto::{GrantRequest, SimulateRequest, SimulateResponse};
use crate::error::HttpError;
use crate::AppState;

pub async fn grant(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GrantRequest>,
) -> Result<Json<()>, HttpError> {
    let principals: Vec<(&str, rag_domain::value_objects::PrincipalType)> = req
        .principals
        .iter()
        .map(|p| (p.id.as_str(), p.principal_type))
        .collect();

    state
        .ctx
        .access
        .grant(
            &user.user_id,
            &req.object,
            req.object_type,
            &principals,
            req.level,
            req.policy.as_deref(),
        )
        .await?;

    Ok(Json(()))
}

pub async fn simulate(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, HttpError> {
    let objects: Vec<&str> = req.objects.iter().map(String::as_str).collect();
    let matrix = state
        .ctx
        .access
        .simulate(&objects, &req.principal, &req.levels)
        .await?;

    Ok(Json(SimulateResponse {
        matrix: matrix
            .into_iter()
            .map(|row| row.into_iter().map(|sim| sim.allowed).collect())
            .collect(),
    }))
}
