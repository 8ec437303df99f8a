//! Composition root: builds every concrete adapter from [`AppConfig`] and
//! wires them into the application-layer services. Mirrors the shape of
//! the teacher's own DI bootstrap (one composition function producing a
//! single context struct other layers depend on), simplified down from
//! its runtime-swappable provider-handle registry since this workspace
//! has exactly one adapter per port rather than a marketplace of them.

use std::sync::Arc;

use rag_application::ingestion::{IngestionOrchestrator, LaneQueues};
use rag_application::jobs::JobLedgerService;
use rag_application::status::StatusService;
use rag_domain::error::{Error, Result};
use rag_domain::ports::access::AccessControl;
use rag_domain::ports::bm25::Bm25Store;
use rag_domain::ports::embed::EmbeddingApi;
use rag_domain::ports::identity::IdentityVerifier;
use rag_domain::ports::metrics::MetricsCollector;
use rag_domain::ports::queue::Queue;
use rag_domain::ports::secrets::SecretsBroker;
use rag_domain::ports::vector_store::{DocumentStore, PageEmbeddingStore, VectorStore};
use rag_domain::value_objects::Lane;
use rag_providers::embedding::HttpEmbeddingApi;
use rag_providers::identity::JwksIdentityVerifier;
use rag_providers::object_store::S3ObjectStore;
use rag_providers::persistence::secrets::SecretsStore;
use rag_providers::persistence::Db;
use rag_providers::queue::RedisQueue;
use rag_providers::status_ws::WsStatusRegistry;
use rag_providers::text_extract::FormatDispatchExtractor;
use rag_providers::visual_extract::RasterVisualExtractor;

use crate::config::AppConfig;
use crate::indexing::Bm25Indexer;
use crate::metrics::PrometheusMetrics;
use crate::worker::LaneWorker;

/// Lane-to-queue-URL mapping derived directly from [`crate::config::QueueConfig`].
struct ConfiguredLanes {
    text: String,
    visual: String,
}

impl LaneQueues for ConfiguredLanes {
    fn queue_url(&self, lane: Lane) -> Option<&str> {
        Some(match lane {
            Lane::Text => &self.text,
            Lane::Visual => &self.visual,
        })
    }
}

/// Every long-lived service the server and worker binaries depend on.
/// Ports the HTTP layer calls directly are exposed as trait objects so
/// `rag-server` depends on `rag-domain`'s ports, not on `rag-providers`'
/// concrete adapter types.
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub status_registry: Arc<WsStatusRegistry>,
    pub status: Arc<StatusService>,
    pub ingestion: Arc<IngestionOrchestrator>,
    pub jobs: Arc<JobLedgerService>,
    pub indexer: Arc<Bm25Indexer>,
    pub text_worker: Arc<LaneWorker>,
    pub visual_worker: Arc<LaneWorker>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub access: Arc<dyn AccessControl>,
    pub secrets: Arc<dyn SecretsBroker>,
    pub embedder: Arc<dyn EmbeddingApi>,
    pub vectors: Arc<dyn VectorStore>,
    pub pages: Arc<dyn PageEmbeddingStore>,
    pub bm25: Arc<dyn Bm25Store>,
    pub documents: Arc<dyn DocumentStore>,
    /// The upload-notifications queue consumer (`rag-server`'s ingest
    /// driver loop) and the lane workers' enqueue side share this handle.
    pub queue: Arc<dyn Queue>,
    pub metrics: Arc<dyn MetricsCollector>,
}

/// Build the full application context from a loaded configuration.
///
/// # Errors
/// Propagates connection failures from Postgres, Redis, or a malformed
/// secrets data key.
pub async fn bootstrap(config: AppConfig) -> Result<AppContext> {
    let config = Arc::new(config);

    let db = Arc::new(
        Db::connect(&config.database.url)
            .await
            .map_err(|e| Error::internal(format!("failed to connect to database: {e}")))?,
    );

    let queue = Arc::new(
        RedisQueue::connect(&config.queue.redis_url, hostname_consumer_name())
            .await
            .map_err(|e| Error::internal(format!("failed to connect to redis: {e}")))?,
    );

    let object_store = Arc::new(S3ObjectStore::from_env().await);
    let embedder = Arc::new(HttpEmbeddingApi::new(
        config.embedding.base_url.clone(),
        config.embedding.api_key.clone(),
    ));
    let identity = Arc::new(JwksIdentityVerifier::new(config.identity.jwks_url.clone()));

    let data_key = hex::decode(&config.secrets.data_key_hex)
        .map_err(|e| Error::internal(format!("secrets.data_key_hex is not valid hex: {e}")))?;
    let stage = std::env::var("RAG_ENV").unwrap_or_else(|_| "development".to_owned());
    let secrets = Arc::new(SecretsStore::new((*db).clone(), &data_key, stage)?);

    let status_registry = Arc::new(WsStatusRegistry::new());
    let status = Arc::new(StatusService::new(db.clone() as _, status_registry.clone() as _));

    let lanes = Arc::new(ConfiguredLanes {
        text: config.queue.text_lane_queue.clone(),
        visual: config.queue.visual_lane_queue.clone(),
    });
    let ingestion = Arc::new(IngestionOrchestrator::new(
        object_store.clone() as _,
        queue.clone() as _,
        secrets.clone() as _,
        status.clone(),
        lanes as _,
    ));

    let jobs = Arc::new(JobLedgerService::new(
        db.clone() as _,
        object_store.clone() as _,
        embedder.clone() as _,
        db.clone() as _,
        db.clone() as _,
    ));

    let indexer = Arc::new(Bm25Indexer::new(db.clone() as _));

    let text_worker = Arc::new(LaneWorker::new(
        Lane::Text,
        config.queue.text_lane_queue.clone(),
        queue.clone() as _,
        object_store.clone() as _,
        db.clone() as _,
        status.clone(),
        Arc::new(FormatDispatchExtractor) as _,
        Arc::new(RasterVisualExtractor) as _,
        embedder.clone() as _,
        db.clone() as _,
        db.clone() as _,
        indexer.clone(),
        config.embedding.default_model.clone(),
    ));

    let visual_worker = Arc::new(LaneWorker::new(
        Lane::Visual,
        config.queue.visual_lane_queue.clone(),
        queue.clone() as _,
        object_store.clone() as _,
        db.clone() as _,
        status.clone(),
        Arc::new(FormatDispatchExtractor) as _,
        Arc::new(RasterVisualExtractor) as _,
        embedder.clone() as _,
        db.clone() as _,
        db.clone() as _,
        indexer.clone(),
        config.embedding.default_model.clone(),
    ));

    let access: Arc<dyn AccessControl> = db.clone() as _;
    let vectors: Arc<dyn VectorStore> = db.clone() as _;
    let pages: Arc<dyn PageEmbeddingStore> = db.clone() as _;
    let documents: Arc<dyn DocumentStore> = db.clone() as _;
    let bm25: Arc<dyn Bm25Store> = db as _;
    let identity: Arc<dyn IdentityVerifier> = identity as _;
    let embedder: Arc<dyn EmbeddingApi> = embedder as _;
    let secrets: Arc<dyn SecretsBroker> = secrets as _;
    let queue: Arc<dyn Queue> = queue as _;
    let metrics: Arc<dyn MetricsCollector> = Arc::new(PrometheusMetrics::new());

    Ok(AppContext {
        config,
        status_registry,
        status,
        ingestion,
        jobs,
        indexer,
        text_worker,
        visual_worker,
        identity,
        access,
        secrets,
        embedder,
        vectors,
        pages,
        bm25,
        documents,
        queue,
        metrics,
    })
}

fn hostname_consumer_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| format!("worker-{}", uuid::Uuid::new_v4()))
}
