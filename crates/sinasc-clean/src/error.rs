//! Error types for the cleaning stages and pipeline.

use thiserror::Error;

use sinasc_config::ConfigError;
use sinasc_ingest::IngestError;

#[derive(Debug, Error)]
pub enum CleanError {
    /// A configured column is absent from the frame.
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// A column that must hold numbers holds text.
    #[error("values must be numeric: column '{column}'")]
    NonNumeric { column: String },

    #[error("invalid cleaning rules: {message}")]
    InvalidRules { message: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl CleanError {
    pub(crate) fn column_not_found(column: &str) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
        }
    }
}

impl From<polars::prelude::PolarsError> for CleanError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;
