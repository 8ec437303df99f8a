//! `Queue` adapter against a real Redis instance (§6 lane queues).

mod common;

use rag_domain::ports::queue::Queue;
use rag_providers::queue::RedisQueue;
use serde_json::json;

#[tokio::test]
async fn send_then_receive_round_trips_the_body() {
    let (url, _container) = common::redis_url().await;
    let queue = RedisQueue::connect(&url, "worker-1").await.unwrap();

    queue.send("lane:text", &json!({"bucket": "b", "key": "k"})).await.unwrap();

    let messages = queue.receive("lane:text", 10).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body["key"], "k");
}

#[tokio::test]
async fn deleted_messages_are_not_redelivered() {
    let (url, _container) = common::redis_url().await;
    let queue = RedisQueue::connect(&url, "worker-2").await.unwrap();

    queue.send("lane:visual", &json!({"n": 1})).await.unwrap();
    let first = queue.receive("lane:visual", 10).await.unwrap();
    assert_eq!(first.len(), 1);

    queue.delete("lane:visual", &first[0].receipt).await.unwrap();

    queue.send("lane:visual", &json!({"n": 2})).await.unwrap();
    let second = queue.receive("lane:visual", 10).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].body["n"], 2);
}

#[tokio::test]
async fn extend_visibility_with_zero_seconds_reclaims_immediately() {
    let (url, _container) = common::redis_url().await;
    let producer = RedisQueue::connect(&url, "worker-3").await.unwrap();
    let consumer = RedisQueue::connect(&url, "worker-4").await.unwrap();

    producer.send("lane:text", &json!({"n": 1})).await.unwrap();
    let received = producer.receive("lane:text", 10).await.unwrap();
    assert_eq!(received.len(), 1);

    consumer
        .extend_visibility("lane:text", &received[0].receipt, 0)
        .await
        .unwrap();

    let reclaimed = consumer.receive("lane:text", 10).await.unwrap();
    assert!(reclaimed.is_empty(), "xreadgroup only returns new (>) entries, not claimed ones");
}
