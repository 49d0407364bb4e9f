//! Lookup store.
//!
//! # State Machine
//! ```text
//! Empty (generation 0) ──install──▶ Loaded(1) ──install──▶ Loaded(2) ──▶ ...
//! ```
//! A failed reload never calls `install`, so the store stays on its
//! current generation.
//!
//! # Design Decisions
//! - One `ArcSwap<Snapshot>` holds table, path and metadata together, so
//!   readers can never pair a table with the wrong path or count
//! - Readers take a lock-free snapshot; installs use `rcu` so concurrent
//!   installs each get a distinct generation and the last one wins
//! - The store is an explicit object shared through `Arc`, not a global

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;

use crate::table::{normalize_key, LoadInfo, Table};

/// The table in effect at some instant, with its provenance.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub table: Arc<Table>,
    /// Source of the table; `None` until the first install.
    pub source_path: Option<PathBuf>,
    /// Load summary; `None` until the first install.
    pub info: Option<LoadInfo>,
    /// Seconds since the Unix epoch at install time (0 when empty).
    pub loaded_at: u64,
    /// Number of installs so far; 0 means nothing installed.
    pub generation: u64,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Look up a raw key against this snapshot's table.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.table.get(&normalize_key(key))
    }
}

/// Holds the active snapshot behind an atomically swappable reference.
#[derive(Debug, Default)]
pub struct LookupStore {
    current: ArcSwap<Snapshot>,
}

impl LookupStore {
    /// Create an empty store (nothing installed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `table` the active table in a single atomic step.
    pub fn install(&self, table: Table, info: LoadInfo) -> Arc<Snapshot> {
        let table = Arc::new(table);
        let loaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut installed = Arc::new(Snapshot::default());
        self.current.rcu(|prev| {
            installed = Arc::new(Snapshot {
                table: table.clone(),
                source_path: Some(info.source_path.clone()),
                info: Some(info.clone()),
                loaded_at,
                generation: prev.generation + 1,
            });
            installed.clone()
        });

        tracing::info!(
            path = %info.source_path.display(),
            records = installed.len(),
            generation = installed.generation,
            "Table installed"
        );
        installed
    }

    /// The snapshot in effect at call time.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Look up a raw key; normalized the same way the loader normalizes keys.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.current.load().lookup(key).map(str::to_owned)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_loaded()
    }
}
