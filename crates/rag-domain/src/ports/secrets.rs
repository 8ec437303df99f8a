//! Secrets Broker (C11): per-document credential parcel with TTL and a
//! daily sweep of orphans.

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::error::Result;

/// Encrypted per-document credential store. `get` is the hard-fail variant
/// (spec §9 open question, resolved normatively in §4.4): a missing
/// parcel is a fatal per-document error, not a soft `success=false`.
#[async_trait]
pub trait SecretsBroker: Send + Sync {
    /// Store `parcel` under a name deterministically derived from
    /// `document_key` (unsafe characters re-encoded, per
    /// `rag-ds/{stage}/{safe_key}`).
    async fn put(&self, document_key: &str, parcel: &Json) -> Result<()>;

    /// Retrieve the parcel for `document_key`. Returns
    /// [`crate::error::Error::Fatal`]-compatible `NotFound` when absent;
    /// callers in C4 treat the miss as fatal.
    async fn get(&self, document_key: &str) -> Result<Json>;

    /// Remove the parcel for `document_key`.
    async fn delete(&self, document_key: &str) -> Result<()>;

    /// Enumerate every parcel's `(document_key, created_at)` under the
    /// stage prefix, for the daily sweep to cross-reference against the
    /// status tracker.
    async fn list_all(&self) -> Result<Vec<(String, chrono::DateTime<chrono::Utc>)>>;
}
