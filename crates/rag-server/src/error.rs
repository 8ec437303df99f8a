//! Maps the core's error taxonomy onto HTTP status codes, per §7's
//! propagation policy: auth/forbidden/not-found/validation get their own
//! status, everything else collapses to 500 with a redacted message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rag_domain::error::Error;
use serde_json::json;

/// Newtype so `rag_domain::error::Error` can implement [`IntoResponse`]
/// without `rag-domain` taking an `axum` dependency.
pub struct HttpError(pub Error);

impl From<Error> for HttpError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Authentication { message } => (StatusCode::UNAUTHORIZED, message.clone()),
            Error::Forbidden { message } => (StatusCode::FORBIDDEN, message.clone()),
            Error::NotFound { resource } => (StatusCode::NOT_FOUND, format!("not found: {resource}")),
            Error::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned()),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        let response = HttpError(Error::forbidden("no write access")).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn database_errors_collapse_to_500_without_leaking_detail() {
        let response = HttpError(Error::database("postgres unreachable")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
