//! JWKS-backed `IdentityVerifier` adapter (§6). The JWKS document is
//! cached and refreshed lazily on an unknown `kid`, rather than on a
//! fixed timer, so a key rotation is picked up on the first request that
//! needs it instead of waiting out a poll interval.

use std::sync::RwLock;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rag_domain::error::{Error, Result};
use rag_domain::ports::identity::{BearerClaims, IdentityVerifier};
use serde::Deserialize;

#[derive(Deserialize)]
struct Jwks {
    keys: Vec<JwkKey>,
}

#[derive(Deserialize, Clone)]
struct JwkKey {
    kid: String,
    n: String,
    e: String,
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "immutable_id")]
    immutable_id: String,
}

/// Verifies RS256-signed bearer tokens against a JWKS endpoint, caching
/// keys by `kid` until a token references one we haven't seen.
pub struct JwksIdentityVerifier {
    client: reqwest::Client,
    jwks_url: String,
    cache: RwLock<Vec<JwkKey>>,
}

impl JwksIdentityVerifier {
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwks_url: jwks_url.into(),
            cache: RwLock::new(Vec::new()),
        }
    }

    fn cached_key(&self, kid: &str) -> Option<JwkKey> {
        self.cache
            .read()
            .expect("jwks cache lock poisoned")
            .iter()
            .find(|k| k.kid == kid)
            .cloned()
    }

    async fn refresh(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| Error::upstream_with_source("jwks", e))?;
        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| Error::upstream_with_source("jwks", e))?;
        *self.cache.write().expect("jwks cache lock poisoned") = jwks.keys;
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for JwksIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<BearerClaims> {
        let header = decode_header(token).map_err(|e| Error::auth(format!("malformed token: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| Error::auth("token is missing a key id"))?;

        let mut key = self.cached_key(&kid);
        if key.is_none() {
            self.refresh().await?;
            key = self.cached_key(&kid);
        }
        let key = key.ok_or_else(|| Error::auth(format!("unknown signing key '{kid}'")))?;

        let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
            .map_err(|e| Error::auth(format!("invalid signing key: {e}")))?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| Error::auth(format!("token verification failed: {e}")))?;

        Ok(BearerClaims {
            user_id: token_data.claims.sub,
            immutable_id: token_data.claims.immutable_id,
        })
    }
}
