//! Process entry point: load configuration, bootstrap the composition
//! root, spawn the lane workers and the ingest driver loop, and serve
//! the HTTP/WebSocket router.

use std::path::PathBuf;

use rag_infrastructure::config::{ConfigLoader, ConfigWatcher};
use rag_infrastructure::{bootstrap, logging};
use rag_server::ingest_worker::IngestWorker;
use rag_server::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = std::env::var("RAG_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let loader = ConfigLoader::new(config_dir.clone());
    let initial = loader.load()?;
    logging::init(initial.logging.format, &initial.logging.level);

    let watcher = ConfigWatcher::start(config_dir, initial.clone())?;
    let config = watcher.current();

    let ctx = std::sync::Arc::new(bootstrap((*config).clone()).await?);

    tokio::spawn({
        let worker = ctx.text_worker.clone();
        async move {
            if let Err(e) = worker.run().await {
                tracing::error!(error = %e, "text lane worker exited");
            }
        }
    });
    tokio::spawn({
        let worker = ctx.visual_worker.clone();
        async move {
            if let Err(e) = worker.run().await {
                tracing::error!(error = %e, "visual lane worker exited");
            }
        }
    });
    tokio::spawn({
        let ingest = IngestWorker::new(
            ctx.config.queue.upload_notifications_queue.clone(),
            ctx.queue.clone(),
            ctx.ingestion.clone(),
            ctx.metrics.clone(),
        );
        async move {
            if let Err(e) = ingest.run().await {
                tracing::error!(error = %e, "ingest worker exited");
            }
        }
    });

    let addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr, "rag-server listening");

    let router = build_router(ctx);
    axum::serve(listener, router).await?;

    Ok(())
}
