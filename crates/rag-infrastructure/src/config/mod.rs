//! Typed application configuration, loaded from `config/{env}.toml` plus
//! `RAG__`-prefixed environment overrides.

mod watcher;

pub use watcher::ConfigWatcher;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use rag_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn resolve_env() -> String {
    std::env::var("RAG_ENV").unwrap_or_else(|_| "development".to_owned())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub redis_url: String,
    pub text_lane_queue: String,
    pub visual_lane_queue: String,
    /// Upload-notification events land here before C4 classifies and
    /// routes them onward to `text_lane_queue`/`visual_lane_queue`.
    pub upload_notifications_queue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub default_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub jwks_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Hex-encoded 32-byte AES-256 data key.
    pub data_key_hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Mounts `/metrics` on the server when set. The collector itself
    /// always records; this only gates whether the core exposes the
    /// scrape endpoint.
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub object_store: ObjectStoreConfig,
    pub embedding: EmbeddingConfig,
    pub identity: IdentityConfig,
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Loads [`AppConfig`] from `config/{RAG_ENV}.toml`, overlaid by any
/// `RAG__SECTION__KEY` environment variable (double underscore separates
/// nesting, matching figment's `Env::prefixed(...).split("__")`
/// convention).
pub struct ConfigLoader {
    config_dir: std::path::PathBuf,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn load(&self) -> Result<AppConfig> {
        let env = resolve_env();
        let path = self.config_dir.join(format!("{env}.toml"));

        let figment = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RAG__").split("__"));

        figment
            .extract()
            .map_err(|e| Error::internal(format!("failed to load configuration from {}: {e}", path.display())))
    }
}
