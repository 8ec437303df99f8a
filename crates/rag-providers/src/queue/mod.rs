//! Redis Streams `Queue` adapter (§6). One consumer group per lane queue,
//! shared by every worker replica; unacked entries are reclaimed with
//! `XCLAIM` rather than redelivered wholesale, so a crashed worker's
//! in-flight messages come back to a live one instead of stalling.

use async_trait::async_trait;
use rag_domain::error::{Error, Result};
use rag_domain::ports::queue::{Queue, QueueMessage};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value as Json;

const CONSUMER_GROUP: &str = "rag-workers";
const FIELD: &str = "body";

fn redis_err(e: redis::RedisError) -> Error {
    Error::upstream_with_source("redis", e)
}

/// Redis-backed lane queue. One `RedisQueue` serves every lane; `queue_url`
/// doubles as the stream key.
pub struct RedisQueue {
    conn: ConnectionManager,
    consumer_name: String,
}

impl RedisQueue {
    pub async fn connect(redis_url: &str, consumer_name: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(redis_err)?;
        let conn = ConnectionManager::new(client).await.map_err(redis_err)?;
        Ok(Self {
            conn,
            consumer_name: consumer_name.into(),
        })
    }

    async fn ensure_group(&self, queue_url: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(queue_url, CONSUMER_GROUP, "0")
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(redis_err(e)),
        }
    }
}

#[async_trait]
impl Queue for RedisQueue {
    async fn send(&self, queue_url: &str, body: &Json) -> Result<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(body)?;
        let _: String = conn
            .xadd(queue_url, "*", &[(FIELD, payload.as_str())])
            .await
            .map_err(redis_err)?;
        Ok(())
    }

    async fn receive(&self, queue_url: &str, max_messages: usize) -> Result<Vec<QueueMessage>> {
        self.ensure_group(queue_url).await?;
        let mut conn = self.conn.clone();

        let opts = redis::streams::StreamReadOptions::default()
            .group(CONSUMER_GROUP, &self.consumer_name)
            .count(max_messages);
        let reply: redis::streams::StreamReadReply = conn
            .xread_options(&[queue_url], &[">"], &opts)
            .await
            .map_err(redis_err)?;

        let mut messages = Vec::new();
        for stream_key in reply.keys {
            for entry in stream_key.ids {
                let Some(redis::Value::BulkString(raw)) = entry.map.get(FIELD) else {
                    continue;
                };
                let body: Json = serde_json::from_slice(raw)?;
                messages.push(QueueMessage {
                    body,
                    receipt: entry.id,
                });
            }
        }
        Ok(messages)
    }

    async fn delete(&self, queue_url: &str, receipt: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(queue_url, CONSUMER_GROUP, &[receipt])
            .await
            .map_err(redis_err)?;
        let _: i64 = conn.xdel(queue_url, &[receipt]).await.map_err(redis_err)?;
        Ok(())
    }

    async fn extend_visibility(&self, queue_url: &str, receipt: &str, seconds: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        if seconds == 0 {
            // Returning the entry to the group immediately means claiming
            // it at zero idle time so the next XREADGROUP can pick it up.
            let _: redis::streams::StreamClaimReply = conn
                .xclaim(queue_url, CONSUMER_GROUP, &self.consumer_name, 0, &[receipt])
                .await
                .map_err(redis_err)?;
            return Ok(());
        }
        // Re-claiming under our own name with a fresh idle budget is the
        // Streams analogue of an SQS `ChangeMessageVisibility` extension.
        let _: redis::streams::StreamClaimReply = conn
            .xclaim(
                queue_url,
                CONSUMER_GROUP,
                &self.consumer_name,
                (seconds * 1000) as usize,
                &[receipt],
            )
            .await
            .map_err(redis_err)?;
        Ok(())
    }
}
