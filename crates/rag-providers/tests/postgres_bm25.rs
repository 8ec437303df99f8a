//! `Bm25Store` adapter against a real Postgres instance (§4.8).

mod common;

use rag_domain::entities::ChunkBm25Row;
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::ports::vector_store::DocumentStore;
use std::collections::HashMap;

fn row(chunk_id: &str, document_id: &str, ordinal: i64, terms: &[(&str, u32)]) -> ChunkBm25Row {
    let term_freqs: HashMap<String, u32> = terms.iter().map(|(t, n)| ((*t).to_owned(), *n)).collect();
    ChunkBm25Row {
        chunk_id: chunk_id.to_owned(),
        document_id: document_id.to_owned(),
        term_freqs,
        doc_length: terms.iter().map(|(_, n)| n).sum(),
        ordinal,
    }
}

#[tokio::test]
async fn upsert_then_fetch_round_trips_the_ordinal() {
    let (db, _container) = common::postgres_db().await;
    db.create("doc-1", "alice", "bucket", "key", "text/plain", 0).await.unwrap();

    let rows = vec![
        row("c1", "doc-1", 0, &[("quick", 1), ("fox", 1)]),
        row("c2", "doc-1", 1, &[("lazy", 1), ("dog", 1)]),
    ];
    db.upsert_chunks("doc-1", &rows).await.unwrap();

    let fetched = db.get_chunk("c2").await.unwrap().expect("row exists");
    assert_eq!(fetched.ordinal, 1);

    let all = db.chunks_for_document("doc-1").await.unwrap();
    let ordinals: std::collections::HashSet<i64> = all.iter().map(|r| r.ordinal).collect();
    assert_eq!(ordinals, [0, 1].into_iter().collect());
}

#[tokio::test]
async fn meta_reflects_total_chunks_after_upsert() {
    let (db, _container) = common::postgres_db().await;
    db.create("doc-2", "alice", "bucket", "key", "text/plain", 0).await.unwrap();

    let rows = vec![
        row("c3", "doc-2", 0, &[("alpha", 2)]),
        row("c4", "doc-2", 1, &[("alpha", 1), ("beta", 3)]),
    ];
    db.upsert_chunks("doc-2", &rows).await.unwrap();

    let meta = db.meta_for_document("doc-2").await.unwrap().expect("meta exists");
    assert_eq!(meta.total_chunks, 2);

    let dfs = db
        .term_document_frequencies("doc-2", &["alpha".to_owned(), "beta".to_owned()])
        .await
        .unwrap();
    assert_eq!(dfs.get("alpha"), Some(&2));
    assert_eq!(dfs.get("beta"), Some(&1));
}

#[tokio::test]
async fn replace_chunks_keeps_total_chunks_unchanged() {
    let (db, _container) = common::postgres_db().await;
    db.create("doc-3", "alice", "bucket", "key", "text/plain", 0).await.unwrap();

    db.upsert_chunks("doc-3", &[row("c5", "doc-3", 0, &[("old", 1)])])
        .await
        .unwrap();
    let before = db.meta_for_document("doc-3").await.unwrap().unwrap().total_chunks;

    db.replace_chunks("doc-3", &[row("c5", "doc-3", 0, &[("new", 1)])])
        .await
        .unwrap();
    let after = db.meta_for_document("doc-3").await.unwrap().unwrap().total_chunks;

    assert_eq!(before, after);
    let dfs = db
        .term_document_frequencies("doc-3", &["old".to_owned(), "new".to_owned()])
        .await
        .unwrap();
    assert_eq!(dfs.get("old").copied().unwrap_or(0), 0);
    assert_eq!(dfs.get("new"), Some(&1));
}
