//! Status Tracker read endpoint (§4.2). Returns the caller's view of a
//! document's ingestion progress, defaulting absent records to 0%.

use axum::extract::{Path, State};
use axum::Json;
use rag_domain::value_objects::Permission;

use crate::auth::AuthUser;
use crate::dto::StatusResponse;
use crate::error::HttpError;
use crate::AppState;

pub async fn get_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, HttpError> {
    let object = format!("{bucket}/{key}");
    if !state
        .ctx
        .access
        .check(&object, &user.user_id, Permission::Read)
        .await?
    {
        return Err(rag_domain::error::Error::forbidden(format!(
            "{} may not read {object}",
            user.user_id
        ))
        .into());
    }

    let record = state.ctx.status.get_or_default(&bucket, &key).await?;
    Ok(Json(record.into()))
}
