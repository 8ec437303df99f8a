//! `StatusTracker` adapter: the `status` table. The 24h TTL sweep and the
//! monotonic-progress rule both apply at write time, not just read time,
//! so two writers racing on the same key never regress observed progress.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rag_domain::constants::STATUS_TTL_HOURS;
use rag_domain::entities::StatusRecord;
use rag_domain::error::{Error, Result};
use rag_domain::ports::status::StatusTracker;
use rag_domain::value_objects::DocumentState;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::Value as Json;

use super::codec::{parse_state, state_name};
use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl StatusTracker for Db {
    async fn update(
        &self,
        bucket: &str,
        key: &str,
        state: DocumentState,
        progress: u8,
        metadata: Option<Json>,
        user: Option<&str>,
    ) -> Result<StatusRecord> {
        let _ = user; // audit-only; not persisted in the current schema
        let pipeline = metadata
            .as_ref()
            .and_then(|m| m.get("pipeline"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let error = metadata
            .as_ref()
            .and_then(|m| m.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO status (bucket, key, state, progress, error, pipeline, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (bucket, key) DO UPDATE SET
                state = EXCLUDED.state,
                progress = GREATEST(status.progress, EXCLUDED.progress),
                error = COALESCE(EXCLUDED.error, status.error),
                pipeline = COALESCE(EXCLUDED.pipeline, status.pipeline),
                updated_at = EXCLUDED.updated_at
             RETURNING bucket, key, state, progress, error, pipeline, updated_at",
            [
                bucket.into(),
                key.into(),
                state_name(state).into(),
                (progress as i16).into(),
                error.into(),
                pipeline.into(),
                Utc::now().into(),
            ],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::internal("status upsert returned no row"))?;
        row_to_status(&row)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<StatusRecord>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT bucket, key, state, progress, error, pipeline, updated_at
             FROM status WHERE bucket = $1 AND key = $2",
            [bucket.into(), key.into()],
        );
        let Some(row) = self.conn.query_one(stmt).await.map_err(db_err)? else {
            return Ok(None);
        };
        Ok(Some(row_to_status(&row)?))
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let cutoff = Utc::now() - Duration::hours(STATUS_TTL_HOURS);
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM status WHERE updated_at < $1",
            [cutoff.into()],
        );
        let result = self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

fn row_to_status(row: &sea_orm::QueryResult) -> Result<StatusRecord> {
    let state: String = row.try_get("", "state").map_err(db_err)?;
    let progress: i16 = row.try_get("", "progress").map_err(db_err)?;
    Ok(StatusRecord {
        bucket: row.try_get("", "bucket").map_err(db_err)?,
        key: row.try_get("", "key").map_err(db_err)?,
        state: parse_state(&state)?,
        progress: progress as u8,
        error: row.try_get("", "error").map_err(db_err)?,
        pipeline: row.try_get("", "pipeline").map_err(db_err)?,
        updated_at: row.try_get("", "updated_at").map_err(db_err)?,
    })
}

