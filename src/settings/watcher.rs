//! Config document watcher for `caddyctl load --watch`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::ConfigError;
use crate::module::ModuleRegistry;

/// Watches a JSON config document and emits each valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    registry: ModuleRegistry,
    update_tx: mpsc::UnboundedSender<Config>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher resolving modules against `registry`.
    ///
    /// Returns the watcher and a receiver for decoded documents.
    pub fn new(path: &Path, registry: ModuleRegistry) -> (Self, mpsc::UnboundedReceiver<Config>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                registry,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Events stop when the returned watcher drops.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let registry = self.registry;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "config document changed");
                        match read_document(&registry, &path) {
                            Ok(config) => {
                                let _ = tx.send(config);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "skipping invalid config document");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "config watcher started");
        Ok(watcher)
    }
}

/// Read and decode a config document.
pub fn read_document(registry: &ModuleRegistry, path: &Path) -> Result<Config, WatchError> {
    let bytes = std::fs::read(path).map_err(WatchError::Io)?;
    registry.decode(&bytes).map_err(WatchError::Decode)
}

/// Failure reading a watched document.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("reading document: {0}")]
    Io(#[source] std::io::Error),

    #[error(transparent)]
    Decode(ConfigError),
}
