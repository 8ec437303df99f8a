//! Domain-level logging facade.
//!
//! The domain crate never depends on `tracing-subscriber` directly; it
//! dispatches through this facade so the infrastructure crate can install
//! the real subscriber at boot without the domain taking on an I/O
//! dependency. Shape mirrors `tracing::(trace|debug|info|warn|error)!`.

/// Logs at info level via the domain log facade.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $msg:expr) => {
        $crate::infra_log::dispatch($crate::infra_log::Level::Info, $ctx, $msg)
    };
}

/// Logs at warn level via the domain log facade.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $msg:expr) => {
        $crate::infra_log::dispatch($crate::infra_log::Level::Warn, $ctx, $msg)
    };
}

/// Logs at error level via the domain log facade.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $msg:expr) => {
        $crate::infra_log::dispatch($crate::infra_log::Level::Error, $ctx, $msg)
    };
}

/// Logging dispatch target. Infrastructure swaps `HOOK` at boot.
pub mod infra_log {
    use std::sync::atomic::{AtomicU8, Ordering};

    /// Log severity, independent of the concrete logging crate in use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        /// Informational message.
        Info = 0,
        /// Something unexpected but non-fatal.
        Warn = 1,
        /// An operation failed.
        Error = 2,
    }

    static MIN_LEVEL: AtomicU8 = AtomicU8::new(0);

    /// Raise or lower the minimum level the facade will forward to `tracing`.
    pub fn set_min_level(level: Level) {
        MIN_LEVEL.store(level as u8, Ordering::Relaxed);
    }

    /// Dispatch a log line. Forwards to `tracing` macros directly: the
    /// domain crate depends on `tracing`'s facade crate only (no
    /// subscriber), which is the standard way to keep pure crates free of
    /// I/O while still emitting structured spans.
    pub fn dispatch(level: Level, ctx: &str, msg: &str) {
        if (level as u8) < MIN_LEVEL.load(Ordering::Relaxed) {
            return;
        }
        match level {
            Level::Info => tracing::info!(target: "rag_domain", ctx, "{msg}"),
            Level::Warn => tracing::warn!(target: "rag_domain", ctx, "{msg}"),
            Level::Error => tracing::error!(target: "rag_domain", ctx, "{msg}"),
        }
    }
}
