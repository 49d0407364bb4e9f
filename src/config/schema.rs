//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::table::{DuplicatePolicy, LoaderOptions};

/// Root configuration for the lookup service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LookupConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Source table settings.
    pub source: SourceConfig,

    /// Shared-secret authentication.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Source table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Default source file. Relative paths are joined to `root`.
    pub path: PathBuf,

    /// Working-directory root for relative source paths.
    pub root: PathBuf,

    /// Header name of the key column.
    pub key_column: String,

    /// Header name of the value column.
    pub value_column: String,

    /// Field delimiter; must be a single ASCII character.
    pub delimiter: String,

    /// Which row wins when normalized keys repeat.
    pub duplicate_policy: DuplicatePolicy,

    /// Reload automatically when the source file changes.
    pub watch: bool,

    /// Quiet period after a change event before reloading, in milliseconds.
    pub watch_debounce_ms: u64,
}

impl SourceConfig {
    /// Loader options derived from this section. Call after validation.
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            key_column: self.key_column.clone(),
            value_column: self.value_column.clone(),
            delimiter: self.delimiter.as_bytes().first().copied().unwrap_or(b','),
            duplicate_policy: self.duplicate_policy,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/links.csv"),
            root: PathBuf::from("."),
            key_column: "Email".to_string(),
            value_column: "Login Link".to_string(),
            delimiter: ",".to_string(),
            duplicate_policy: DuplicatePolicy::FirstWins,
            watch: false,
            watch_debounce_ms: 250,
        }
    }
}

/// Shared-secret authentication for mutating endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected header value. Empty disables authentication.
    pub api_key: String,

    /// Header carrying the secret.
    pub header: String,
}

impl AuthConfig {
    pub fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            header: "x-api-key".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LookupConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.source.path, PathBuf::from("data/links.csv"));
        assert!(!config.auth.enabled());
        assert_eq!(config.auth.header, "x-api-key");
        assert_eq!(config.source.duplicate_policy, DuplicatePolicy::FirstWins);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LookupConfig = toml::from_str(
            r#"
            [listener]
            port = 8088

            [source]
            path = "/srv/links.tsv"
            delimiter = "\t"
            duplicate_policy = "last_wins"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8088);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.source.key_column, "Email");
        assert_eq!(config.observability.log_format, LogFormat::Json);

        let opts = config.source.loader_options();
        assert_eq!(opts.delimiter, b'\t');
        assert_eq!(opts.duplicate_policy, DuplicatePolicy::LastWins);
    }
}
