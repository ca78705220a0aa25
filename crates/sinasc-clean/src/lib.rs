//! Rule-driven cleaning of SINASC natality records.
//!
//! The stage functions ([`filter_rows`], [`filter_by_zscore`], [`fill_fixed`],
//! [`fill_mean`] and the structural stages) each take a frame and return a
//! new one, leaving the caller's frame untouched. [`clean`] chains them over
//! a streamed input file.
//!
//! Operations that can meet an absent column take an [`ErrorPolicy`]:
//! `Permissive` logs a warning and skips, `Strict` returns
//! [`CleanError::ColumnNotFound`]. The pipeline defaults to `Permissive` so
//! extracts from different years, whose schemas drift, still clean.

mod error;
mod filter;
mod impute;
mod moments;
mod outlier;
mod pipeline;
mod stages;

pub use error::{CleanError, Result};
pub use filter::filter_rows;
pub use impute::{fill_fixed, fill_mean, fill_mean_with};
pub use moments::{ColumnMoments, ColumnStats, RunningStats};
pub use outlier::{filter_by_zscore, filter_by_zscore_with};
pub use pipeline::{
    CleanOptions, CleanReport, GlobalStatistics, clean, clean_chunk, clean_with,
};
pub use stages::{
    cast_int32, drop_columns, drop_duplicates, drop_incomplete_rows, drop_missing, set_index,
};

pub use sinasc_common::ErrorPolicy;
