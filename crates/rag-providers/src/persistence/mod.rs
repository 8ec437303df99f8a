//! Postgres + pgvector persistence. Entities beyond plain scalar columns
//! (vector, tsvector) are queried with parameterized raw SQL rather than
//! `sea-orm`'s derive-macro entities, since the vector/tsvector column
//! types aren't representable by the stock entity derive.

pub mod access;
pub mod bm25;
mod codec;
pub mod documents;
pub mod jobs;
pub mod migration;
pub mod secrets;
pub mod status;
pub mod vectors;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Shared Postgres connection handle, cloned (cheaply — it's pool-backed)
/// into each repository adapter.
#[derive(Clone)]
pub struct Db {
    pub(crate) conn: DatabaseConnection,
}

impl Db {
    /// Connect to `url` and verify the connection is live.
    pub async fn connect(url: &str) -> Result<Self, DbErr> {
        let conn = Database::connect(url).await?;
        Ok(Self { conn })
    }
}
