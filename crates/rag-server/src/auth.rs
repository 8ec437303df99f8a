//! Bearer-token extraction (§6): every inbound request carries a claim
//! verified against the configured JWKS. Handlers that need the caller's
//! identity take [`AuthUser`] as an argument instead of reading headers
//! themselves.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use rag_domain::error::Error;
use rag_domain::ports::identity::BearerClaims;

use crate::error::HttpError;
use crate::AppState;

/// The verified caller of the current request.
pub struct AuthUser(pub BearerClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        let TypedHeader(Authorization(bearer)) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| HttpError(Error::auth("missing bearer token")))?;

        let claims = app.ctx.identity.verify(bearer.token()).await?;
        Ok(Self(claims))
    }
}
