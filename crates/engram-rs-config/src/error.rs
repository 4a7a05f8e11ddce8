//! Config loading and validation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading or validating an [`crate::EngramConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A document is not valid json5.
    #[error("cannot parse config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: json5::Error,
    },
    #[error("cannot decode config: {0}")]
    Decode(#[from] serde_json::Error),
    /// A key is unknown, wrongly typed or out of range.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// The selected embedder provider lacks a setting it needs.
    #[error("embedder provider {provider} requires {field}")]
    MissingProviderSetting {
        provider: &'static str,
        field: &'static str,
    },
}
