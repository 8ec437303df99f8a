//! `JobLedger` adapter: the `jobs` table (C12).

use async_trait::async_trait;
use chrono::Utc;
use rag_domain::entities::EmbeddingJob;
use rag_domain::error::{Error, Result};
use rag_domain::ports::jobs::{JobLedger, JobResult};
use rag_domain::value_objects::JobState;
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use uuid::Uuid;

use super::Db;

fn db_err(e: sea_orm::DbErr) -> Error {
    Error::database_with_source("postgres", e)
}

#[async_trait]
impl JobLedger for Db {
    async fn init(&self, owner: &str, document_id: &str, initial_state: JobState) -> Result<String> {
        let job_id = Uuid::new_v4().to_string();
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO jobs (job_id, document_id, owner, state, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
            [
                job_id.clone().into(),
                document_id.into(),
                owner.into(),
                state_name(initial_state).into(),
                Utc::now().into(),
            ],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(job_id)
    }

    async fn update(&self, owner: &str, job_id: &str, state: JobState) -> Result<()> {
        self.assert_owner(owner, job_id).await?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE jobs SET state = $2, updated_at = $3 WHERE job_id = $1",
            [job_id.into(), state_name(state).into(), Utc::now().into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn set_result(&self, owner: &str, job_id: &str, result: JobResult) -> Result<()> {
        self.assert_owner(owner, job_id).await?;
        let (inline, blob_bucket, blob_key) = match result {
            JobResult::Inline(json) => (Some(json), None, None),
            JobResult::Blob { bucket, key } => (None, Some(bucket), Some(key)),
        };
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE jobs SET result_inline = $2, result_blob_bucket = $3, result_blob_key = $4, updated_at = $5
             WHERE job_id = $1",
            [
                job_id.into(),
                inline.into(),
                blob_bucket.into(),
                blob_key.into(),
                Utc::now().into(),
            ],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }

    async fn stop(&self, owner: &str, job_id: &str) -> Result<()> {
        self.update(owner, job_id, JobState::Stopped).await
    }

    async fn get(&self, owner: &str, job_id: &str) -> Result<EmbeddingJob> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT job_id, document_id, owner, state, result_inline, result_blob_bucket, result_blob_key, updated_at
             FROM jobs WHERE job_id = $1",
            [job_id.into()],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::not_found(format!("job {job_id}")))?;

        let recorded_owner: String = row.try_get("", "owner").map_err(db_err)?;
        if recorded_owner != owner {
            return Err(Error::forbidden(format!("{owner} does not own job {job_id}")));
        }

        let state: String = row.try_get("", "state").map_err(db_err)?;
        let blob_bucket: Option<String> = row.try_get("", "result_blob_bucket").map_err(db_err)?;
        let blob_key: Option<String> = row.try_get("", "result_blob_key").map_err(db_err)?;

        Ok(EmbeddingJob {
            job_id: row.try_get("", "job_id").map_err(db_err)?,
            document_id: row.try_get("", "document_id").map_err(db_err)?,
            owner: recorded_owner,
            state: parse_state(&state)?,
            result_inline: row.try_get("", "result_inline").map_err(db_err)?,
            result_blob: blob_bucket.zip(blob_key),
            updated_at: row.try_get("", "updated_at").map_err(db_err)?,
        })
    }

    async fn poll_state(&self, job_id: &str) -> Result<JobState> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT state FROM jobs WHERE job_id = $1",
            [job_id.into()],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::not_found(format!("job {job_id}")))?;
        let state: String = row.try_get("", "state").map_err(db_err)?;
        parse_state(&state)
    }

    async fn delete(&self, owner: &str, job_id: &str) -> Result<()> {
        self.assert_owner(owner, job_id).await?;
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM jobs WHERE job_id = $1",
            [job_id.into()],
        );
        self.conn.execute(stmt).await.map_err(db_err)?;
        Ok(())
    }
}

impl Db {
    async fn assert_owner(&self, owner: &str, job_id: &str) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT owner FROM jobs WHERE job_id = $1",
            [job_id.into()],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::not_found(format!("job {job_id}")))?;
        let recorded: String = row.try_get("", "owner").map_err(db_err)?;
        if recorded != owner {
            return Err(Error::forbidden(format!("{owner} does not own job {job_id}")));
        }
        Ok(())
    }
}

fn state_name(state: JobState) -> &'static str {
    match state {
        JobState::Queued => "queued",
        JobState::Running => "running",
        JobState::Finished => "finished",
        JobState::Stopped => "stopped",
        JobState::Failed => "failed",
    }
}

fn parse_state(s: &str) -> Result<JobState> {
    match s {
        "queued" => Ok(JobState::Queued),
        "running" => Ok(JobState::Running),
        "finished" => Ok(JobState::Finished),
        "stopped" => Ok(JobState::Stopped),
        "failed" => Ok(JobState::Failed),
        other => Err(Error::corruption(format!("unknown job state '{other}'"))),
    }
}
