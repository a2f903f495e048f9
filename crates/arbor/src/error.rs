//! Error types for Arbor.

use std::path::PathBuf;

use crate::filter::{FilterOp, FilterType, FilterValue};

/// Result type alias for Arbor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by filtered views, filter construction and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Tree, cache or predicate failure from the core.
    #[error(transparent)]
    Core(#[from] arbor_core::Error),

    /// The filter text could not be compiled.
    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A group was given an operation other than `and`/`or`.
    #[error("'{op}' is not a group operation")]
    InvalidGroupOp { op: FilterOp },

    /// The operation cannot be applied to values of this filter type.
    #[error("Operation '{op}' is not supported for {filter_type} filters")]
    UnsupportedOperation { op: FilterOp, filter_type: FilterType },

    /// A `date_time` filter was given a field value that is not a date.
    #[error("Cannot read {value} as a date")]
    InvalidDate { value: String },

    /// The configuration is well-formed but unusable.
    #[error("Invalid filter configuration: {0}")]
    Config(String),

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON filter definition or configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML configuration.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a date error for a field value.
    pub fn invalid_date(value: &FilterValue) -> Self {
        Self::InvalidDate {
            value: format!("{value:?}"),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
