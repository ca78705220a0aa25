//! Exact-code partitions by state or region and their per-partition sums.

use polars::prelude::{BooleanChunked, Column, DataFrame, NamedFrom, NewChunkedArray};
use serde::Serialize;
use sinasc_common::{CellValue, column_cells};

use crate::error::{Result, StatsError};
use crate::geo::{GeoEntry, GeoMapping, geo_codes};

/// Municipality-of-birth column of SINASC extracts.
pub const DEFAULT_GEO_COLUMN: &str = "CODMUNNASC";

/// Rows of one state or region.
#[derive(Debug, Clone)]
pub struct Partition {
    pub entry: &'static GeoEntry,
    pub label: String,
    pub frame: DataFrame,
}

/// [`separate_by_location_on`] over [`DEFAULT_GEO_COLUMN`].
pub fn separate_by_location(df: &DataFrame, mapping: GeoMapping) -> Result<Vec<Partition>> {
    separate_by_location_on(df, DEFAULT_GEO_COLUMN, mapping)
}

/// Split `df` into one partition per entry of `mapping`, in table order,
/// empty partitions included.
///
/// The geography column is truncated to the mapping's prefix length (two
/// characters for states, one for regions) and stored as text; rows are
/// then matched exactly against each code. Partitions are labelled with the
/// state or region name. The caller's frame is not modified.
pub fn separate_by_location_on(
    df: &DataFrame,
    geo_column: &str,
    mapping: GeoMapping,
) -> Result<Vec<Partition>> {
    let prefix_len = mapping.prefix_len();
    let truncated: Vec<Option<String>> = geo_codes(df, geo_column)?
        .into_iter()
        .map(|code| code.map(|code| code.chars().take(prefix_len).collect()))
        .collect();

    let mut frame = df.clone();
    frame.with_column(Column::new(geo_column.into(), truncated.clone()))?;

    mapping
        .entries()
        .iter()
        .map(|entry| {
            let keep: Vec<bool> = truncated
                .iter()
                .map(|code| code.as_deref() == Some(entry.code))
                .collect();
            let mask = BooleanChunked::from_slice("location".into(), &keep);
            Ok(Partition {
                entry,
                label: entry.name.to_string(),
                frame: frame.filter(&mask)?,
            })
        })
        .collect()
}

/// Sum, row count and mean of one column in one partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub label: String,
    pub total_sum: f64,
    /// All rows of the partition, including those with a missing value.
    pub count: usize,
    /// Mean of the observed values; `None` when there are none.
    pub mean: Option<f64>,
}

/// Summarise `column` in each partition. Non-numeric cells count as
/// missing.
pub fn location_summary(partitions: &[Partition], column: &str) -> Result<Vec<LocationSummary>> {
    if partitions.is_empty() {
        return Err(StatsError::EmptyTable);
    }
    for partition in partitions {
        if partition.frame.column(column).is_err() {
            return Err(StatsError::column_not_found(column));
        }
    }

    Ok(partitions
        .iter()
        .map(|partition| {
            let values: Vec<f64> = column_cells(&partition.frame, column)
                .unwrap_or_default()
                .iter()
                .filter_map(CellValue::coerce_f64)
                .collect();
            let total_sum: f64 = values.iter().sum();
            LocationSummary {
                label: partition.label.clone(),
                total_sum,
                count: partition.frame.height(),
                mean: (!values.is_empty()).then(|| total_sum / values.len() as f64),
            }
        })
        .collect())
}
