//! Shared utilities for the SINASC crates.
//!
//! This crate provides the value-level vocabulary used across the workspace:
//! Polars `AnyValue` conversions, the [`ScalarValue`] carried by rule files,
//! the [`CellValue`] used when a column has to be rebuilt cell by cell, and
//! the [`ErrorPolicy`] switch shared by every dual-mode operation.

pub mod policy;
pub mod polars;
pub mod value;

pub use crate::policy::ErrorPolicy;
pub use crate::polars::{
    any_is_null, any_to_f64, any_to_i64, any_to_string, column_cells, column_names,
    format_numeric, is_numeric_dtype, parse_f64, parse_i64,
};
pub use crate::value::{CellValue, ScalarValue, build_column};
