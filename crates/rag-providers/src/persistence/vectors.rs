//! `VectorStore` and `PageEmbeddingStore` adapters: `chunks` and
//! `page_embeddings`, including the two ANN-indexed embedding channels.

use async_trait::async_trait;
use chrono::Utc;
use pgvector::Vector;
use rag_domain::entities::{Chunk, PageEmbedding};
use rag_domain::error::{Error, Result};
use rag_domain::ports::vector_store::{DenseHit, PageEmbeddingStore, VectorStore};
use rag_domain::value_objects::{ChunkLocation, EmbeddingVector};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::Value as Json;

use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl VectorStore for Db {
    async fn upsert_chunk(&self, chunk: &Chunk) -> Result<()> {
        let location = serde_json::to_value(&chunk.location)?;
        let embedding = chunk.embedding.clone().map(Vector::from);
        let embedding_qa = chunk.embedding_qa.clone().map(Vector::from);

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO chunks (id, document_id, ordinal, content, location, embedding, embedding_qa, metadata, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                location = EXCLUDED.location,
                embedding = EXCLUDED.embedding,
                embedding_qa = EXCLUDED.embedding_qa,
                ordinal = EXCLUDED.ordinal,
                metadata = EXCLUDED.metadata,
                updated_at = EXCLUDED.updated_at",
            [
                chunk.id.clone().into(),
                chunk.document_id.clone().into(),
                chunk.ordinal.into(),
                chunk.content.clone().into(),
                location.into(),
                embedding.into(),
                embedding_qa.into(),
                chunk.metadata.clone().into(),
                Utc::now().into(),
            ],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn get_chunk(&self, chunk_id: &str) -> Result<Option<Chunk>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, document_id, ordinal, content, location, embedding, embedding_qa, metadata, updated_at
             FROM chunks WHERE id = $1",
            [chunk_id.into()],
        );
        let Some(row) = self.conn.query_one(stmt).await.map_err(db_err)? else {
            return Ok(None);
        };
        Ok(Some(row_to_chunk(&row)?))
    }

    async fn search(
        &self,
        document_id: &str,
        query: &EmbeddingVector,
        limit: usize,
    ) -> Result<Vec<DenseHit>> {
        let query_vector = Vector::from(query.to_vec());
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, ordinal, 1 - (embedding <#> $2) AS score
             FROM chunks
             WHERE document_id = $1 AND embedding IS NOT NULL
             ORDER BY embedding <#> $2
             LIMIT $3",
            [document_id.into(), query_vector.into(), (limit as i64).into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.into_iter()
            .map(|row| {
                Ok(DenseHit {
                    chunk_id: row.try_get("", "id").map_err(db_err)?,
                    score: row.try_get("", "score").map_err(db_err)?,
                    ordinal: row.try_get("", "ordinal").map_err(db_err)?,
                })
            })
            .collect()
    }

    async fn delete_chunks(&self, document_id: &str, chunk_ids: &[String]) -> Result<()> {
        if chunk_ids.is_empty() {
            return Ok(());
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM chunks WHERE document_id = $1 AND id = ANY($2)",
            [document_id.into(), chunk_ids.to_vec().into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM chunks WHERE document_id = $1",
            [document_id.into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, document_id, ordinal, content, location, embedding, embedding_qa, metadata, updated_at
             FROM chunks WHERE document_id = $1 ORDER BY ordinal",
            [document_id.into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.iter().map(row_to_chunk).collect()
    }
}

fn row_to_chunk(row: &sea_orm::QueryResult) -> Result<Chunk> {
    let location_json: Json = row.try_get("", "location").map_err(db_err)?;
    let location: ChunkLocation = serde_json::from_value(location_json)?;
    let embedding: Option<Vector> = row.try_get("", "embedding").map_err(db_err)?;
    let embedding_qa: Option<Vector> = row.try_get("", "embedding_qa").map_err(db_err)?;

    Ok(Chunk {
        id: row.try_get("", "id").map_err(db_err)?,
        document_id: row.try_get("", "document_id").map_err(db_err)?,
        ordinal: row.try_get("", "ordinal").map_err(db_err)?,
        content: row.try_get("", "content").map_err(db_err)?,
        location,
        embedding: embedding.map(|v| v.to_vec()),
        embedding_qa: embedding_qa.map(|v| v.to_vec()),
        metadata: row.try_get("", "metadata").map_err(db_err)?,
        updated_at: row.try_get("", "updated_at").map_err(db_err)?,
    })
}

#[async_trait]
impl PageEmbeddingStore for Db {
    async fn upsert_page(&self, page: &PageEmbedding) -> Result<()> {
        let vectors = serde_json::to_value(&page.vectors)?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO page_embeddings (document_id, page, vectors, tokens_formula_a, tokens_formula_b)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (document_id, page) DO UPDATE SET
                vectors = EXCLUDED.vectors,
                tokens_formula_a = EXCLUDED.tokens_formula_a,
                tokens_formula_b = EXCLUDED.tokens_formula_b",
            [
                page.document_id.clone().into(),
                (page.page as i32).into(),
                vectors.into(),
                (page.tokens_formula_a as i32).into(),
                (page.tokens_formula_b as i32).into(),
            ],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn pages_for_document(&self, document_id: &str) -> Result<Vec<PageEmbedding>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT document_id, page, vectors, tokens_formula_a, tokens_formula_b
             FROM page_embeddings WHERE document_id = $1 ORDER BY page",
            [document_id.into()],
        );
        let rows = self.conn.query_all(stmt).await.map_err(db_err)?;
        rows.into_iter()
            .map(|row| {
                let vectors_json: Json = row.try_get("", "vectors").map_err(db_err)?;
                let vectors = serde_json::from_value(vectors_json)?;
                let page: i32 = row.try_get("", "page").map_err(db_err)?;
                let tokens_a: i32 = row.try_get("", "tokens_formula_a").map_err(db_err)?;
                let tokens_b: i32 = row.try_get("", "tokens_formula_b").map_err(db_err)?;
                Ok(PageEmbedding {
                    document_id: row.try_get("", "document_id").map_err(db_err)?,
                    page: page as u32,
                    vectors,
                    tokens_formula_a: tokens_a as u32,
                    tokens_formula_b: tokens_b as u32,
                })
            })
            .collect()
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM page_embeddings WHERE document_id = $1",
            [document_id.into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }
}
