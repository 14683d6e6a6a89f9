//! Error types for tuning and wave data loading.

use thiserror::Error;

/// Errors that can occur when loading tuning or wave files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed.
    #[error("Parse error in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Values parsed but are not usable.
    #[error("Invalid {field}: {details}")]
    Invalid { field: &'static str, details: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, details: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            details: details.into(),
        }
    }
}
