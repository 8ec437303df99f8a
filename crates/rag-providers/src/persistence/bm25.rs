//! `Bm25Store` adapter: `chunk_bm25`, `doc_term_stats`, `doc_bm25_meta`.
//!
//! `upsert_chunks` merges into existing document-term-frequency rows
//! rather than replacing them (§4.8); `replace_chunks` (partial
//! re-embedding) subtracts the old chunks' term contributions before
//! applying the new rows, leaving `total_chunks` untouched.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rag_domain::entities::{ChunkBm25Row, DocumentBm25Meta};
use rag_domain::error::{Error, Result};
use rag_domain::ports::bm25::Bm25Store;
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};
use serde_json::Value as Json;

use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl Bm25Store for Db {
    async fn upsert_chunks(&self, document_id: &str, rows: &[ChunkBm25Row]) -> Result<()> {
        let txn = self.conn.begin().await.map_err(db_err)?;

        for row in rows {
            upsert_chunk_row(&txn, row).await?;
            for term in row.term_freqs.keys() {
                bump_term_df(&txn, document_id, term, 1).await?;
            }
        }
        recompute_meta(&txn, document_id, rows.len() as i64).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn replace_chunks(&self, document_id: &str, rows: &[ChunkBm25Row]) -> Result<()> {
        let txn = self.conn.begin().await.map_err(db_err)?;

        for row in rows {
            if let Some(old) = fetch_chunk_row(&txn, &row.chunk_id).await? {
                for term in old.term_freqs.keys() {
                    bump_term_df(&txn, document_id, term, -1).await?;
                }
            }
            upsert_chunk_row(&txn, row).await?;
            for term in row.term_freqs.keys() {
                bump_term_df(&txn, document_id, term, 1).await?;
            }
        }
        recompute_meta(&txn, document_id, 0).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_chunk(&self, chunk_id: &str) -> Result<Option<ChunkBm25Row>> {
        fetch_chunk_row(&self.conn, chunk_id).await
    }

    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<ChunkBm25Row>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT chunk_id, document_id, term_freqs, doc_length, ordinal FROM chunk_bm25 WHERE document_id = $1",
            [document_id.into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.iter().map(row_to_bm25).collect()
    }

    async fn meta_for_document(&self, document_id: &str) -> Result<Option<DocumentBm25Meta>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT document_id, total_chunks, avg_chunk_length, total_unique_terms, updated_at
             FROM doc_bm25_meta WHERE document_id = $1",
            [document_id.into()],
        );
        let Some(row) = self.conn.query_one(stmt).await.map_err(db_err)? else {
            return Ok(None);
        };
        let total_chunks: i32 = row.try_get("", "total_chunks").map_err(db_err)?;
        let total_unique_terms: i32 = row.try_get("", "total_unique_terms").map_err(db_err)?;
        Ok(Some(DocumentBm25Meta {
            document_id: row.try_get("", "document_id").map_err(db_err)?,
            total_chunks: total_chunks as u32,
            avg_chunk_length: row.try_get("", "avg_chunk_length").map_err(db_err)?,
            total_unique_terms: total_unique_terms as u32,
            updated_at: row.try_get("", "updated_at").map_err(db_err)?,
        }))
    }

    async fn term_document_frequencies(
        &self,
        document_id: &str,
        terms: &[String],
    ) -> Result<HashMap<String, u32>> {
        if terms.is_empty() {
            return Ok(HashMap::new());
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT term, df FROM doc_term_stats WHERE document_id = $1 AND term = ANY($2)",
            [document_id.into(), terms.to_vec().into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.into_iter()
            .map(|row| {
                let df: i32 = row.try_get("", "df").map_err(db_err)?;
                Ok((row.try_get("", "term").map_err(db_err)?, df as u32))
            })
            .collect()
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let txn = self.conn.begin().await.map_err(db_err)?;
        for sql in [
            "DELETE FROM chunk_bm25 WHERE document_id = $1",
            "DELETE FROM doc_term_stats WHERE document_id = $1",
            "DELETE FROM doc_bm25_meta WHERE document_id = $1",
        ] {
            let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [document_id.into()]);
            txn.execute(stmt).await.map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_chunks(&self, document_id: &str, chunk_ids: &[String]) -> Result<()> {
        if chunk_ids.is_empty() {
            return Ok(());
        }
        let txn = self.conn.begin().await.map_err(db_err)?;
        for chunk_id in chunk_ids {
            if let Some(old) = fetch_chunk_row(&txn, chunk_id).await? {
                for term in old.term_freqs.keys() {
                    bump_term_df(&txn, document_id, term, -1).await?;
                }
            }
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM chunk_bm25 WHERE document_id = $1 AND chunk_id = ANY($2)",
            [document_id.into(), chunk_ids.to_vec().into()],
        );
        txn.execute(stmt).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

async fn upsert_chunk_row<C: ConnectionTrait>(conn: &C, row: &ChunkBm25Row) -> Result<()> {
    let term_freqs: Json = serde_json::to_value(&row.term_freqs)?;
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO chunk_bm25 (chunk_id, document_id, term_freqs, doc_length, ordinal)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (chunk_id) DO UPDATE SET
            term_freqs = EXCLUDED.term_freqs,
            doc_length = EXCLUDED.doc_length,
            ordinal = EXCLUDED.ordinal",
        [
            row.chunk_id.clone().into(),
            row.document_id.clone().into(),
            term_freqs.into(),
            (row.doc_length as i32).into(),
            row.ordinal.into(),
        ],
    );
    conn.execute(stmt).await.map_err(db_err)?;
    Ok(())
}

async fn fetch_chunk_row<C: ConnectionTrait>(conn: &C, chunk_id: &str) -> Result<Option<ChunkBm25Row>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT chunk_id, document_id, term_freqs, doc_length, ordinal FROM chunk_bm25 WHERE chunk_id = $1",
        [chunk_id.into()],
    );
    let Some(row) = conn.query_one(stmt).await.map_err(db_err)? else {
        return Ok(None);
    };
    Ok(Some(row_to_bm25(&row)?))
}

fn row_to_bm25(row: &sea_orm::QueryResult) -> Result<ChunkBm25Row> {
    let term_freqs_json: Json = row.try_get("", "term_freqs").map_err(db_err)?;
    let term_freqs = serde_json::from_value(term_freqs_json)?;
    let doc_length: i32 = row.try_get("", "doc_length").map_err(db_err)?;
    Ok(ChunkBm25Row {
        chunk_id: row.try_get("", "chunk_id").map_err(db_err)?,
        document_id: row.try_get("", "document_id").map_err(db_err)?,
        term_freqs,
        doc_length: doc_length as u32,
        ordinal: row.try_get("", "ordinal").map_err(db_err)?,
    })
}

async fn bump_term_df<C: ConnectionTrait>(conn: &C, document_id: &str, term: &str, delta: i32) -> Result<()> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO doc_term_stats (document_id, term, df) VALUES ($1, $2, GREATEST($3, 0))
         ON CONFLICT (document_id, term) DO UPDATE SET df = GREATEST(doc_term_stats.df + $3, 0)",
        [document_id.into(), term.into(), delta.into()],
    );
    conn.execute(stmt).await.map_err(db_err)?;
    Ok(())
}

async fn recompute_meta<C: ConnectionTrait>(conn: &C, document_id: &str, chunks_added: i64) -> Result<()> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT COUNT(*)::bigint AS total_chunks, COALESCE(AVG(doc_length), 0)::double precision AS avg_len
         FROM chunk_bm25 WHERE document_id = $1",
        [document_id.into()],
    );
    let row = conn
        .query_one(stmt)
        .await
        .map_err(db_err)?
        .ok_or_else(|| Error::internal("aggregate query returned no row"))?;
    let total_chunks: i64 = row.try_get("", "total_chunks").map_err(db_err)?;
    let avg_len: f64 = row.try_get("", "avg_len").map_err(db_err)?;
    let _ = chunks_added; // total_chunks is always recomputed from the table, never incremented blindly

    let terms_stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT COUNT(*)::bigint AS n FROM doc_term_stats WHERE document_id = $1 AND df > 0",
        [document_id.into()],
    );
    let terms_row = conn
        .query_one(terms_stmt)
        .await
        .map_err(db_err)?
        .ok_or_else(|| Error::internal("aggregate query returned no row"))?;
    let total_unique_terms: i64 = terms_row.try_get("", "n").map_err(db_err)?;

    let meta_stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO doc_bm25_meta (document_id, total_chunks, avg_chunk_length, total_unique_terms, updated_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (document_id) DO UPDATE SET
            total_chunks = EXCLUDED.total_chunks,
            avg_chunk_length = EXCLUDED.avg_chunk_length,
            total_unique_terms = EXCLUDED.total_unique_terms,
            updated_at = EXCLUDED.updated_at",
        [
            document_id.into(),
            total_chunks.into(),
            avg_len.into(),
            total_unique_terms.into(),
            Utc::now().into(),
        ],
    );
    conn.execute(meta_stmt).await.map_err(db_err)?;
    Ok(())
}
