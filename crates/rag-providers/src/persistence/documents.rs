//! `DocumentStore` adapter: the shared `documents` table.

use async_trait::async_trait;
use chrono::Utc;
use rag_domain::entities::Document;
use rag_domain::error::{Error, Result};
use rag_domain::ports::vector_store::DocumentStore;
use rag_domain::value_objects::{DocumentState, Lane};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::Value as Json;

use super::codec::{parse_state, state_name};
use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl DocumentStore for Db {
    async fn create(
        &self,
        id: &str,
        owner: &str,
        bucket: &str,
        key: &str,
        mime: &str,
        size: u64,
    ) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO documents (id, owner, storage_bucket, storage_key, lane, mime, size, state, updated_at)
             VALUES ($1, $2, $3, $4, 'text', $5, $6, 'uploaded', $7)
             ON CONFLICT (id) DO NOTHING",
            [
                id.into(),
                owner.into(),
                bucket.into(),
                key.into(),
                mime.into(),
                (size as i64).into(),
                Utc::now().into(),
            ],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, owner, storage_bucket, storage_key, lane, mime, size, state, updated_at
             FROM documents WHERE id = $1",
            [id.into()],
        );
        let Some(row) = self.conn.query_one(stmt).await.map_err(db_err)? else {
            return Ok(None);
        };

        let lane: String = row.try_get("", "lane").map_err(db_err)?;
        let state: String = row.try_get("", "state").map_err(db_err)?;
        let size: i64 = row.try_get("", "size").map_err(db_err)?;

        Ok(Some(Document {
            id: row.try_get("", "id").map_err(db_err)?,
            owner: row.try_get("", "owner").map_err(db_err)?,
            storage_bucket: row.try_get("", "storage_bucket").map_err(db_err)?,
            storage_key: row.try_get("", "storage_key").map_err(db_err)?,
            lane: parse_lane(&lane)?,
            mime: row.try_get("", "mime").map_err(db_err)?,
            size: size as u64,
            state: parse_state(&state)?,
            updated_at: row.try_get("", "updated_at").map_err(db_err)?,
        }))
    }

    async fn set_lane(&self, id: &str, lane: Lane) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE documents SET lane = $2, updated_at = $3 WHERE id = $1",
            [id.into(), lane.to_string().into(), Utc::now().into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn set_state(&self, id: &str, state: DocumentState) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE documents SET state = $2, updated_at = $3 WHERE id = $1",
            [id.into(), state_name(state).into(), Utc::now().into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // ON DELETE CASCADE covers chunks/page_embeddings/chunk_bm25/
        // doc_term_stats/doc_bm25_meta in one statement.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM documents WHERE id = $1",
            [id.into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn metadata(&self, id: &str) -> Result<Json> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT metadata FROM documents WHERE id = $1",
            [id.into()],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::not_found(format!("document {id}")))?;
        row.try_get("", "metadata").map_err(db_err)
    }
}

fn parse_lane(s: &str) -> Result<Lane> {
    match s {
        "text" => Ok(Lane::Text),
        "visual" => Ok(Lane::Visual),
        other => Err(Error::corruption(format!("unknown lane '{other}'"))),
    }
}
