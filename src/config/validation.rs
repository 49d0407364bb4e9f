//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the loader settings describe a usable source
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LookupConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::LookupConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("source.key_column and source.value_column must differ (both \"{0}\")")]
    SameColumns(String),

    #[error("source.delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    Address { field: &'static str, value: String },

    #[error("auth.header is not a valid header name: {0}")]
    HeaderName(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &LookupConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let source = &config.source;

    if source.path.as_os_str().is_empty() {
        errors.push(ValidationError::Empty { field: "source.path" });
    }
    if source.key_column.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "source.key_column" });
    }
    if source.value_column.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "source.value_column" });
    }
    if !source.key_column.is_empty() && source.key_column == source.value_column {
        errors.push(ValidationError::SameColumns(source.key_column.clone()));
    }
    if source.delimiter.len() != 1 || !source.delimiter.is_ascii() {
        errors.push(ValidationError::Delimiter(source.delimiter.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_size" });
    }

    if config.listener.host.is_empty() {
        errors.push(ValidationError::Empty { field: "listener.host" });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if HeaderName::from_bytes(config.auth.header.as_bytes()).is_err() {
        errors.push(ValidationError::HeaderName(config.auth.header.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
