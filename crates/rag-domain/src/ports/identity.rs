//! Identity external contract (§6): every inbound request carries a bearer
//! claim verified against a published JWKS. The core never issues tokens.

use async_trait::async_trait;

use crate::error::Result;

/// The minimal claim set the core relies on.
#[derive(Debug, Clone)]
pub struct BearerClaims {
    /// Stable user identifier.
    pub user_id: String,
    /// Immutable identifier, stable even if `user_id` is reassigned upstream.
    pub immutable_id: String,
}

/// JWKS-backed bearer token verifier.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` against the published JWKS, returning its claims.
    /// An invalid signature, expired token, or unknown principal yields
    /// [`crate::error::Error::Authentication`].
    async fn verify(&self, token: &str) -> Result<BearerClaims>;
}
