//! WebSocket status fan-out (§4.2): a client subscribes to one
//! `(bucket, key)` and receives every subsequent [`StatusRecord`] update
//! as a JSON frame, until it disconnects or the connection is dropped by
//! the registry.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use rag_domain::value_objects::Permission;
use tokio::sync::mpsc;

use crate::auth::AuthUser;
use crate::error::HttpError;
use crate::AppState;

pub async fn status_socket(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((bucket, key)): Path<(String, String)>,
    ws: WebSocketUpgrade,
) -> Result<Response, HttpError> {
    let object = format!("{bucket}/{key}");
    if !state.ctx.access.check(&object, &user.user_id, Permission::Read).await? {
        return Err(rag_domain::error::Error::forbidden(format!("{} may not read {object}", user.user_id)).into());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(state, bucket, key, socket)))
}

async fn handle_socket(state: AppState, bucket: String, key: String, mut socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.ctx.status_registry.subscribe(&bucket, &key, tx);

    if let Ok(initial) = state.ctx.status.get_or_default(&bucket, &key).await {
        if let Ok(payload) = serde_json::to_string(&initial) {
            if socket.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
    }

    while let Some(record) = rx.recv().await {
        let Ok(payload) = serde_json::to_string(&record) else {
            continue;
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }
}
