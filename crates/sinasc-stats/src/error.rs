//! Error types for aggregation and export.

use thiserror::Error;

use sinasc_ingest::IngestError;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("column '{column}' not found in DataFrame")]
    ColumnNotFound { column: String },

    /// The input frame has no rows.
    #[error("DataFrame is empty")]
    EmptyTable,

    /// The column has rows but no numeric observation.
    #[error("column '{column}' has no observations")]
    NoObservations { column: String },

    #[error("column '{column}' holds a non-finite value")]
    NonFiniteValue { column: String },

    /// The observed range needs too many intervals at the requested width.
    #[error("range of column '{column}' is too wide to tabulate")]
    RangeTooWide { column: String },

    #[error("interval width must be greater than zero")]
    InvalidInterval,

    /// Mapping name other than `state` or `region`.
    #[error("invalid mapping '{name}': use 'state' or 'region'")]
    InvalidMapping { name: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl StatsError {
    pub(crate) fn column_not_found(column: &str) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
        }
    }
}

impl From<polars::prelude::PolarsError> for StatsError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
