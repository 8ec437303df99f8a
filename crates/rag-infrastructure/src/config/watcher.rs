//! Hot-reloads [`super::AppConfig`] on change, the way the teacher's own
//! `ConfigWatcher` does: a filesystem watch triggers a full reload, with
//! the previous configuration kept live (and logged, not panicked on) if
//! the new file fails to parse.

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use rag_domain::error::Result;
use rag_domain::log_warn;
use tokio::sync::mpsc;

use super::{AppConfig, ConfigLoader};

/// Live, swappable handle to the current configuration. Readers call
/// [`ConfigWatcher::current`] for a cheap `Arc` snapshot; the watcher
/// task installs a new one whenever the backing file changes.
pub struct ConfigWatcher {
    current: Arc<ArcSwap<AppConfig>>,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    pub fn start(config_dir: PathBuf, initial: AppConfig) -> Result<Self> {
        let current = Arc::new(ArcSwap::from_pointee(initial));
        let loader = ConfigLoader::new(config_dir.clone());

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if res.is_ok() {
                let _ = tx.send(());
            }
        })
        .map_err(|e| rag_domain::error::Error::internal(format!("failed to start config watcher: {e}")))?;

        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .map_err(|e| rag_domain::error::Error::internal(format!("failed to watch {}: {e}", config_dir.display())))?;

        let reload_target = Arc::clone(&current);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                match loader.load() {
                    Ok(config) => reload_target.store(Arc::new(config)),
                    Err(e) => log_warn!("config_watcher", &format!("reload failed, keeping previous config: {e}")),
                }
            }
        });

        Ok(Self {
            current,
            _watcher: watcher,
        })
    }

    pub fn current(&self) -> Arc<AppConfig> {
        self.current.load_full()
    }
}
