//! Object store external contract (§6), consumed by C4 (validation reads),
//! C6/C5 (source bytes), and C12 (overflow result blobs).

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::error::Result;

/// Metadata returned by a `head` call.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    /// Size in bytes.
    pub size: u64,
    /// Reported MIME type.
    pub mime: String,
    /// User-supplied metadata attached at upload time.
    pub metadata: Json,
}

/// S3-shaped object store contract.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch size/mime/metadata without downloading the body.
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    /// Download the full object body.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Upload `bytes` under `(bucket, key)` with the given content type.
    async fn put(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}
