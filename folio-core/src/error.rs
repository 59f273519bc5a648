//! Error types for folio-core.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a raw configuration cannot become [`Settings`](crate::types::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including line context from serde_yaml.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document contained no recognised keys.
    #[error("config is empty")]
    Empty,

    /// `github.username` missing or blank.
    #[error("github.username is required")]
    MissingIdentity,

    /// `projects.github.automatic.limit` was zero.
    #[error("projects.github.automatic.limit must be at least 1")]
    InvalidLimit,
}
