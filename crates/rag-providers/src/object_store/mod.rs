//! S3-compatible `ObjectStore` adapter (§6).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use rag_domain::error::{Error, Result};
use rag_domain::ports::object_store::{ObjectMetadata, ObjectStore};
use serde_json::Value as Json;

fn upstream_err(service: &str, e: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::upstream_with_source(service, e)
}

/// Thin wrapper over the AWS SDK S3 client. Works against any
/// S3-compatible endpoint (MinIO, R2, …) via the usual `aws-config`
/// endpoint override.
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| upstream_err("s3", e))?;

        let size = output.content_length().unwrap_or(0).max(0) as u64;
        let mime = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let metadata = output
            .metadata()
            .map(|m| {
                Json::Object(
                    m.iter()
                        .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                        .collect(),
                )
            })
            .unwrap_or_else(|| Json::Object(Default::default()));

        Ok(ObjectMetadata { size, mime, metadata })
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| upstream_err("s3", e))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| upstream_err("s3", e))?
            .into_bytes();
        Ok(bytes.to_vec())
    }

    async fn put(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| upstream_err("s3", e))?;
        Ok(())
    }
}
