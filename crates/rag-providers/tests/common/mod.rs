//! Shared container bootstrap for the Postgres/Redis integration suite.
//! Requires a local Docker daemon; these are the adapter-level tests the
//! unit suites under `src/` can't reach without one.

use rag_providers::persistence::migration::Migrator;
use rag_providers::persistence::Db;
use sea_orm_migration::MigratorTrait;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::Redis;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;

pub async fn postgres_db() -> (Db, ContainerAsync<Postgres>) {
    let container = Postgres::default().start().await.expect("start postgres container");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let migration_conn = sea_orm::Database::connect(&url).await.expect("connect for migration");
    Migrator::up(&migration_conn, None).await.expect("run migrations");

    let db = Db::connect(&url).await.expect("connect to postgres");
    (db, container)
}

pub async fn redis_url() -> (String, ContainerAsync<Redis>) {
    let container = Redis::default().start().await.expect("start redis container");
    let host = container.get_host().await.expect("container host");
    let port = container.get_host_port_ipv4(6379).await.expect("container port");
    (format!("redis://{host}:{port}"), container)
}
