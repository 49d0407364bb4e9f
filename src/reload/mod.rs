//! Reload orchestration.
//!
//! # Data Flow
//! ```text
//! POST /reload, SIGHUP, or source watcher
//!     → resolve_source_path (default / relative to data root)
//!     → TableLoader::load on a blocking thread
//!     → LookupStore::install on success
//!     → old snapshot keeps serving on failure
//! ```

pub mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use crate::observability::metrics;
use crate::store::LookupStore;
use crate::table::{LoadError, LoadInfo, LoadedTable, TableLoader};

/// Resolve the path a reload should read.
///
/// A missing or blank request falls back to `default`; relative paths are
/// joined to `root`.
pub fn resolve_source_path(root: &Path, default: &Path, requested: Option<&str>) -> PathBuf {
    let chosen = match requested.map(str::trim) {
        Some(p) if !p.is_empty() => Path::new(p),
        _ => default,
    };
    if chosen.is_absolute() {
        chosen.to_path_buf()
    } else {
        root.join(chosen)
    }
}

/// Loads tables and installs them into a store.
#[derive(Debug, Clone)]
pub struct Reloader {
    store: Arc<LookupStore>,
    loader: TableLoader,
    root: PathBuf,
    default_path: PathBuf,
    /// Bumped after every successful install.
    installs: Arc<watch::Sender<u64>>,
}

impl Reloader {
    pub fn new(
        store: Arc<LookupStore>,
        loader: TableLoader,
        root: PathBuf,
        default_path: PathBuf,
    ) -> Self {
        let (installs, _) = watch::channel(0);
        Self {
            store,
            loader,
            root,
            default_path,
            installs: Arc::new(installs),
        }
    }

    pub fn store(&self) -> &Arc<LookupStore> {
        &self.store
    }

    /// Notified after each successful install; read the store for the new state.
    pub fn subscribe_installs(&self) -> watch::Receiver<u64> {
        self.installs.subscribe()
    }

    /// Fully resolved default source path.
    pub fn default_path(&self) -> PathBuf {
        resolve_source_path(&self.root, &self.default_path, None)
    }

    pub fn resolve(&self, requested: Option<&str>) -> PathBuf {
        resolve_source_path(&self.root, &self.default_path, requested)
    }

    /// Load and install synchronously. Used at startup and from the watcher thread.
    pub fn reload_blocking(&self, requested: Option<&str>) -> Result<LoadInfo, LoadError> {
        let path = self.resolve(requested);
        let started = Instant::now();
        let result = self.loader.load(&path);
        self.finish(&path, started, result)
    }

    /// Load off the async executor, then install. Lookups are never blocked on the read.
    pub async fn reload(&self, requested: Option<&str>) -> Result<LoadInfo, LoadError> {
        self.reload_path(self.resolve(requested)).await
    }

    /// Same as `reload` for an already resolved path.
    pub async fn reload_path(&self, path: PathBuf) -> Result<LoadInfo, LoadError> {
        let started = Instant::now();

        let loader = self.loader.clone();
        let task_path = path.clone();
        let result = tokio::task::spawn_blocking(move || loader.load(&task_path))
            .await
            .map_err(|e| LoadError::Task(e.to_string()))
            .and_then(|r| r);

        self.finish(&path, started, result)
    }

    fn finish(
        &self,
        path: &Path,
        started: Instant,
        result: Result<LoadedTable, LoadError>,
    ) -> Result<LoadInfo, LoadError> {
        match result {
            Ok(loaded) => {
                let info = loaded.info.clone();
                let snapshot = self.store.install(loaded.table, loaded.info);
                self.installs.send_replace(snapshot.generation);
                metrics::record_reload("success", started);
                metrics::record_table_size(info.record_count);
                if info.duplicates_dropped > 0 {
                    tracing::warn!(
                        path = %path.display(),
                        duplicates_dropped = info.duplicates_dropped,
                        "Duplicate keys dropped during load"
                    );
                }
                Ok(info)
            }
            Err(e) => {
                metrics::record_reload(e.kind(), started);
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    generation = self.store.snapshot().generation,
                    "Reload failed, keeping current table"
                );
                Err(e)
            }
        }
    }
}
