use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS vector").await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                storage_bucket TEXT NOT NULL,
                storage_key TEXT NOT NULL,
                lane TEXT NOT NULL,
                mime TEXT NOT NULL,
                size BIGINT NOT NULL,
                state TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}',
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        // Dense embedding dimension fixed at deployment time; 1536 is the
        // default model's width (§4.7). A deployment using a differently
        // sized model runs a follow-up migration to widen the column.
        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                ordinal BIGINT NOT NULL,
                content TEXT NOT NULL,
                location JSONB NOT NULL DEFAULT '{}',
                embedding VECTOR(1536),
                embedding_qa VECTOR(1536),
                content_tsv TSVECTOR GENERATED ALWAYS AS (to_tsvector('english', content)) STORED,
                metadata JSONB NOT NULL DEFAULT '{}',
                updated_at TIMESTAMPTZ NOT NULL,
                UNIQUE (document_id, ordinal)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS chunks_embedding_hnsw_idx
             ON chunks USING hnsw (embedding vector_ip_ops)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS chunks_embedding_qa_hnsw_idx
             ON chunks USING hnsw (embedding_qa vector_ip_ops)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS chunks_content_tsv_idx ON chunks USING gin (content_tsv)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS page_embeddings (
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                page INTEGER NOT NULL,
                vectors JSONB NOT NULL,
                tokens_formula_a INTEGER NOT NULL,
                tokens_formula_b INTEGER NOT NULL,
                PRIMARY KEY (document_id, page)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS chunk_bm25 (
                chunk_id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                term_freqs JSONB NOT NULL,
                doc_length INTEGER NOT NULL,
                ordinal BIGINT NOT NULL DEFAULT 0
            )",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS chunk_bm25_document_idx ON chunk_bm25 (document_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS doc_term_stats (
                document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                term TEXT NOT NULL,
                df INTEGER NOT NULL,
                PRIMARY KEY (document_id, term)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS doc_bm25_meta (
                document_id TEXT PRIMARY KEY REFERENCES documents(id) ON DELETE CASCADE,
                total_chunks INTEGER NOT NULL,
                avg_chunk_length DOUBLE PRECISION NOT NULL,
                total_unique_terms INTEGER NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS status (
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                state TEXT NOT NULL,
                progress SMALLINT NOT NULL,
                error TEXT,
                pipeline TEXT,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (bucket, key)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS access (
                object_id TEXT NOT NULL,
                principal_id TEXT NOT NULL,
                permission TEXT NOT NULL,
                principal_type TEXT NOT NULL,
                object_type TEXT NOT NULL,
                policy TEXT,
                PRIMARY KEY (object_id, principal_id)
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                owner TEXT NOT NULL,
                state TEXT NOT NULL,
                result_inline JSONB,
                result_blob_bucket TEXT,
                result_blob_key TEXT,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TABLE IF NOT EXISTS secret_parcels (
                document_key TEXT PRIMARY KEY,
                ciphertext TEXT NOT NULL,
                nonce TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            "secret_parcels",
            "jobs",
            "access",
            "status",
            "doc_bm25_meta",
            "doc_term_stats",
            "chunk_bm25",
            "page_embeddings",
            "chunks",
            "documents",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table} CASCADE"))
                .await?;
        }
        Ok(())
    }
}
