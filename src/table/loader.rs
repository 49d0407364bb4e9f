//! Streaming table loader.
//!
//! # Responsibilities
//! - Open the source and fail fast when it is missing
//! - Resolve the key and value columns from the header row
//! - Stream rows one at a time, skipping rows with an empty key or value
//! - Produce a complete Table or an error, never a partial table

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

use super::error::{LoadError, LoadResult};
use super::{normalize_key, DuplicatePolicy, Table, TableBuilder};

const UTF8_BOM: char = '\u{feff}';

/// Loader settings, taken from the `source` config section.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Header name of the key column.
    pub key_column: String,
    /// Header name of the value column.
    pub value_column: String,
    /// Field delimiter byte.
    pub delimiter: u8,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            key_column: "Email".to_string(),
            value_column: "Login Link".to_string(),
            delimiter: b',',
            duplicate_policy: DuplicatePolicy::FirstWins,
        }
    }
}

/// Summary of one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadInfo {
    /// Entries in the resulting table.
    pub record_count: usize,
    pub source_path: PathBuf,
    /// Data rows read, excluding the header.
    pub rows_read: usize,
    /// Rows with an empty key or value after trimming.
    pub rows_skipped: usize,
    /// Rows whose normalized key repeated an earlier row.
    pub duplicates_dropped: usize,
}

/// A finished table together with its load summary.
#[derive(Debug)]
pub struct LoadedTable {
    pub table: Table,
    pub info: LoadInfo,
}

/// Builds tables from delimited sources.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    options: LoaderOptions,
}

impl TableLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Load a table from a file on disk.
    pub fn load(&self, path: &Path) -> LoadResult<LoadedTable> {
        let not_found = |source| LoadError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(not_found)?;
        if !metadata.is_file() {
            return Err(not_found(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let file = File::open(path).map_err(not_found)?;

        self.load_reader(file, path)
    }

    /// Load a table from any reader. `path` labels the source in `LoadInfo` and errors.
    pub fn load_reader<R: Read>(&self, reader: R, path: &Path) -> LoadResult<LoadedTable> {
        let started = Instant::now();
        let parse_error = |source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.options.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().map_err(parse_error)?.clone();
        let key_idx = self.column_index(&headers, &self.options.key_column, path)?;
        let value_idx = self.column_index(&headers, &self.options.value_column, path)?;

        let mut builder = TableBuilder::new(self.options.duplicate_policy);
        let mut rows_read = 0;
        let mut rows_skipped = 0;

        for record in rdr.records() {
            let record = record.map_err(parse_error)?;
            rows_read += 1;

            let key = normalize_key(record.get(key_idx).unwrap_or_default());
            let value = record.get(value_idx).unwrap_or_default().trim();
            if key.is_empty() || value.is_empty() {
                rows_skipped += 1;
                continue;
            }

            builder.insert(key, value.to_string());
        }

        let duplicates_dropped = builder.duplicates();
        let table = builder.finish();
        let info = LoadInfo {
            record_count: table.len(),
            source_path: path.to_path_buf(),
            rows_read,
            rows_skipped,
            duplicates_dropped,
        };

        tracing::debug!(
            path = %path.display(),
            records = info.record_count,
            rows_read,
            rows_skipped,
            duplicates_dropped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Table built"
        );

        Ok(LoadedTable { table, info })
    }

    fn column_index(&self, headers: &StringRecord, column: &str, path: &Path) -> LoadResult<usize> {
        headers
            .iter()
            .position(|h| h.trim_start_matches(UTF8_BOM).trim() == column)
            .ok_or_else(|| LoadError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })
    }
}
