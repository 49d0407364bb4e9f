//! Email-to-link table subsystem.
//!
//! # Data Flow
//! ```text
//! delimited source file
//!     → loader.rs (stream rows via csv, normalize keys)
//!     → TableBuilder (dedupe per DuplicatePolicy)
//!     → Table (immutable) + LoadInfo
//!     → handed to the store for install
//! ```
//!
//! # Design Decisions
//! - A Table is never mutated after `TableBuilder::finish`
//! - Keys are normalized with the same function the store uses for lookups
//! - Duplicate handling is an explicit policy, first occurrence wins by default

pub mod error;
pub mod key;
pub mod loader;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use error::LoadError;
pub use key::normalize_key;
pub use loader::{LoadInfo, LoadedTable, LoaderOptions, TableLoader};

/// How the builder resolves two rows with the same normalized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the value of the earliest row; later rows are dropped.
    #[default]
    FirstWins,
    /// Later rows overwrite earlier ones.
    LastWins,
}

/// Immutable mapping from normalized key to link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    entries: HashMap<String, String>,
}

impl Table {
    /// Look up an already-normalized key.
    pub fn get(&self, normalized_key: &str) -> Option<&str> {
        self.entries.get(normalized_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Working table owned by a single load until it is finished.
#[derive(Debug)]
pub struct TableBuilder {
    entries: HashMap<String, String>,
    policy: DuplicatePolicy,
    duplicates: usize,
}

impl TableBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            duplicates: 0,
        }
    }

    /// Insert a record. The key must already be normalized and both sides non-empty.
    ///
    /// Returns `false` when the key was already present, whichever value was kept.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(mut slot) => {
                self.duplicates += 1;
                if self.policy == DuplicatePolicy::LastWins {
                    slot.insert(value);
                }
                false
            }
        }
    }

    /// Number of rows whose key collided with an earlier row.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> Table {
        Table {
            entries: self.entries,
        }
    }
}
