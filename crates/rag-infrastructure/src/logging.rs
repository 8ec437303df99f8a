//! Tracing-subscriber bootstrap. `rag-domain`'s logging facade only
//! depends on `tracing`'s macros; this is where a concrete subscriber is
//! actually installed, the same split the teacher keeps between its
//! domain-level logging port and its own `tracing`-backed adapter.

use rag_domain::infra_log::{self, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogFormat;

/// Install the global tracing subscriber and raise the domain facade's
/// floor to match. Call once at process startup, before any other
/// logging occurs.
pub fn init(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer: Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> = match format {
        LogFormat::Json => Box::new(tracing_subscriber::fmt::layer().json()),
        LogFormat::Pretty => Box::new(tracing_subscriber::fmt::layer().pretty()),
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();

    infra_log::set_min_level(level_for(level));
}

fn level_for(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "error" => Level::Error,
        "warn" | "warning" => Level::Warn,
        _ => Level::Info,
    }
}
