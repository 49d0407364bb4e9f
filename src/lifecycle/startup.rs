//! Startup orchestration.
//!
//! Fail fast: a missing or unreadable source at startup is fatal, so the
//! service never listens without a table.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, LookupConfig};
use crate::reload::Reloader;
use crate::store::LookupStore;
use crate::table::{LoadError, TableLoader};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("initial table load failed: {0}")]
    InitialLoad(#[from] LoadError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Create the store and reloader and perform the initial load.
pub fn bootstrap(config: &LookupConfig) -> Result<Reloader, StartupError> {
    let store = Arc::new(LookupStore::new());
    let loader = TableLoader::new(config.source.loader_options());
    let reloader = Reloader::new(
        store,
        loader,
        config.source.root.clone(),
        config.source.path.clone(),
    );

    let info = reloader.reload_blocking(None)?;
    tracing::info!(
        path = %info.source_path.display(),
        records = info.record_count,
        rows_skipped = info.rows_skipped,
        duplicates_dropped = info.duplicates_dropped,
        "Initial table loaded"
    );

    Ok(reloader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LookupConfig::default();
        config.source.root = dir.path().to_path_buf();

        let err = bootstrap(&config).unwrap_err();
        assert!(matches!(err, StartupError::InitialLoad(LoadError::SourceNotFound { .. })));
    }

    #[test]
    fn test_bootstrap_installs_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("data/links.csv"),
            "Email,Login Link\nA@Example.com,http://x/1\n",
        )
        .unwrap();

        let mut config = LookupConfig::default();
        config.source.root = dir.path().to_path_buf();

        let reloader = bootstrap(&config).unwrap();
        assert!(reloader.store().is_loaded());
        assert_eq!(reloader.store().lookup("a@example.com"), Some("http://x/1".to_string()));
    }
}
