//! Load error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a table from a source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source path does not exist, is not a regular file, or cannot be opened.
    #[error("source not found: {}: {source}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Header row does not name a required column.
    #[error("source {} has no \"{column}\" column", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// Row stream is malformed (reported by the csv reader).
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Blocking load task panicked or was cancelled.
    #[error("load task failed: {0}")]
    Task(String),
}

impl LoadError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::SourceNotFound { .. } => "source_not_found",
            LoadError::MissingColumn { .. } => "missing_column",
            LoadError::Parse { .. } => "parse",
            LoadError::Task(_) => "task",
        }
    }
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;
