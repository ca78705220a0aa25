//! Fixed-width relative frequency tables.

use polars::prelude::DataFrame;
use serde::Serialize;
use sinasc_common::{CellValue, column_cells};
use tracing::debug;

use crate::error::{Result, StatsError};
use crate::geo::{GeoMapping, filter_by_prefix, geo_codes};

/// One interval `[lower, upper)` of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyBin {
    /// `"{lower}"` for unit width, `"{lower} a {upper}"` otherwise.
    pub label: String,
    pub lower: i64,
    pub upper: i64,
    pub count: usize,
    pub relative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub column: String,
    pub width: u32,
    /// Observations counted (missing values excluded).
    pub total: usize,
    pub bins: Vec<FrequencyBin>,
}

impl FrequencyTable {
    pub fn relative_frequencies(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.relative).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.bins.iter().map(|bin| bin.label.as_str()).collect()
    }
}

fn observations(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let cells = column_cells(df, column).ok_or_else(|| StatsError::column_not_found(column))?;
    Ok(cells.iter().filter_map(CellValue::coerce_f64).collect())
}

/// Upper bound on the number of intervals in one table.
pub const MAX_BINS: usize = 1_000_000;

/// Intervals `[start + k * step, start + (k + 1) * step)` for `k < bins`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BinRange {
    start: i64,
    step: i64,
    bins: usize,
}

/// Intervals starting at `floor(min)` and advancing while
/// `lower < floor(max) + width`.
fn bin_range(values: &[f64], column: &str, width: u32) -> Result<BinRange> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFiniteValue {
            column: column.to_string(),
        });
    }
    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);
    let (Some(min), Some(max)) = (min, max) else {
        return Err(StatsError::NoObservations {
            column: column.to_string(),
        });
    };

    let too_wide = || StatsError::RangeTooWide {
        column: column.to_string(),
    };
    // Floors are integral, so the casts are exact until they saturate.
    let start = min.floor() as i128;
    let end = max.floor() as i128;
    let step = i128::from(width);
    let bins = (end - start + step - 1) / step + 1;
    if bins > MAX_BINS as i128 {
        return Err(too_wide());
    }
    let last_upper = start + bins * step;
    if i64::try_from(last_upper).is_err() {
        return Err(too_wide());
    }
    Ok(BinRange {
        start: i64::try_from(start).map_err(|_| too_wide())?,
        step: i64::from(width),
        bins: bins as usize,
    })
}

/// Count `values` into the intervals of `range` in one pass. Values outside
/// the range are not counted.
fn tabulate(column: &str, values: &[f64], width: u32, range: BinRange) -> FrequencyTable {
    let mut counts = vec![0usize; range.bins];
    let origin = range.start as f64;
    let step = range.step as f64;
    for value in values {
        let offset = ((value - origin) / step).floor();
        if offset >= 0.0
            && let Some(count) = counts.get_mut(offset as usize)
        {
            *count += 1;
        }
    }

    let total = values.len();
    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(k, count)| {
            let lower = range.start + k as i64 * range.step;
            let upper = lower + range.step;
            let label = if width == 1 {
                lower.to_string()
            } else {
                format!("{lower} a {upper}")
            };
            let relative = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            FrequencyBin {
                label,
                lower,
                upper,
                count,
                relative,
            }
        })
        .collect();
    FrequencyTable {
        column: column.to_string(),
        width,
        total,
        bins,
    }
}

/// Relative frequencies of `column` in intervals of `width`, spanning the
/// observed range.
///
/// Missing and non-numeric cells are excluded from numerator and
/// denominator. Fails with [`StatsError::EmptyTable`] on a frame without
/// rows, [`StatsError::InvalidInterval`] for a zero width,
/// [`StatsError::NonFiniteValue`] when the column holds an infinity and
/// [`StatsError::RangeTooWide`] when the range needs more than
/// [`MAX_BINS`] intervals.
pub fn relative_frequency(df: &DataFrame, column: &str, width: u32) -> Result<FrequencyTable> {
    if width == 0 {
        return Err(StatsError::InvalidInterval);
    }
    if df.height() == 0 {
        return Err(StatsError::EmptyTable);
    }
    let values = observations(df, column)?;
    let range = bin_range(&values, column, width)?;
    Ok(tabulate(column, &values, width, range))
}

/// [`relative_frequency`] per state, grouping rows by the state prefix of
/// `geo_column`.
///
/// Every table uses the range observed over the whole frame so the bins
/// line up across states. States without rows are omitted; a state whose
/// rows have no observation of `column` gets an all-zero table. Results
/// are keyed by state abbreviation, in table order.
pub fn relative_frequency_by_state(
    df: &DataFrame,
    geo_column: &str,
    column: &str,
    width: u32,
) -> Result<Vec<(String, FrequencyTable)>> {
    if width == 0 {
        return Err(StatsError::InvalidInterval);
    }
    if df.height() == 0 {
        return Err(StatsError::EmptyTable);
    }
    let codes = geo_codes(df, geo_column)?;
    let range = bin_range(&observations(df, column)?, column, width)?;

    let mut tables = Vec::new();
    for state in GeoMapping::State.entries() {
        let partition = filter_by_prefix(df, &codes, state.code)?;
        if partition.height() == 0 {
            continue;
        }
        let values = observations(&partition, column)?;
        debug!(state = state.abbreviation, rows = partition.height(), "tabulating state");
        tables.push((
            state.abbreviation.to_string(),
            tabulate(column, &values, width, range),
        ));
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    fn frame(values: Vec<Option<i64>>) -> DataFrame {
        DataFrame::new(vec![Column::new("Dados".into(), values)]).unwrap()
    }

    #[test]
    fn unit_width_labels_each_value() {
        let df = frame([1, 1, 1, 2, 3, 2, 1, 5].into_iter().map(Some).collect());
        let table = relative_frequency(&df, "Dados", 1).unwrap();
        assert_eq!(table.labels(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(
            table.relative_frequencies(),
            vec![0.5, 0.25, 0.125, 0.0, 0.125]
        );
        assert_eq!(table.total, 8);
    }

    #[test]
    fn wider_intervals_use_range_labels() {
        let df = frame([1, 1, 1, 2, 3, 2, 1, 5].into_iter().map(Some).collect());
        let table = relative_frequency(&df, "Dados", 2).unwrap();
        assert_eq!(table.labels(), vec!["1 a 3", "3 a 5", "5 a 7"]);
        assert_eq!(table.relative_frequencies(), vec![0.75, 0.125, 0.125]);
    }

    #[test]
    fn missing_values_are_excluded() {
        let df = frame(vec![Some(1), None, Some(1), Some(2), Some(3), Some(2), None, Some(5)]);
        let table = relative_frequency(&df, "Dados", 2).unwrap();
        assert_eq!(table.total, 6);
        let freqs = table.relative_frequencies();
        assert!((freqs[0] - 4.0 / 6.0).abs() < 1e-12);
        assert!((freqs[1] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn bins_cover_values_on_boundaries() {
        let df = DataFrame::new(vec![Column::new(
            "Dados".into(),
            vec![-1.5f64, 0.0, 2.9, 3.0, 5.99, 6.0],
        )])
        .unwrap();
        let table = relative_frequency(&df, "Dados", 3).unwrap();
        assert_eq!(table.labels(), vec!["-2 a 1", "1 a 4", "4 a 7", "7 a 10"]);
        let counts: Vec<usize> = table.bins.iter().map(|bin| bin.count).collect();
        assert_eq!(counts, vec![2, 2, 2, 0]);
    }

    #[test]
    fn long_columns_with_many_bins() {
        let values: Vec<i64> = (0..200_000).map(|i| i % 5000).collect();
        let df = DataFrame::new(vec![Column::new("PESO".into(), values)]).unwrap();
        let table = relative_frequency(&df, "PESO", 1).unwrap();
        assert_eq!(table.bins.len(), 5000);
        assert!(table.bins.iter().all(|bin| bin.count == 40));
    }

    #[test]
    fn unbounded_ranges_are_errors() {
        let infinite =
            DataFrame::new(vec![Column::new("X".into(), vec![1.0f64, f64::INFINITY])]).unwrap();
        assert!(matches!(
            relative_frequency(&infinite, "X", 1),
            Err(StatsError::NonFiniteValue { .. })
        ));

        let huge = DataFrame::new(vec![Column::new("X".into(), vec![1.0f64, 1e19])]).unwrap();
        assert!(matches!(
            relative_frequency(&huge, "X", 1),
            Err(StatsError::RangeTooWide { .. })
        ));

        let wide = DataFrame::new(vec![Column::new("X".into(), vec![0i64, 10_000_000])]).unwrap();
        assert!(matches!(
            relative_frequency(&wide, "X", 1),
            Err(StatsError::RangeTooWide { .. })
        ));
        assert_eq!(relative_frequency(&wide, "X", 100).unwrap().bins.len(), 100_001);
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        let empty = frame(Vec::new());
        assert!(matches!(
            relative_frequency(&empty, "Dados", 1),
            Err(StatsError::EmptyTable)
        ));
        let df = frame(vec![Some(1)]);
        assert!(matches!(
            relative_frequency(&df, "Dados", 0),
            Err(StatsError::InvalidInterval)
        ));
        assert!(matches!(
            relative_frequency(&df, "Outro", 1),
            Err(StatsError::ColumnNotFound { .. })
        ));
        let all_missing = frame(vec![None, None]);
        assert!(matches!(
            relative_frequency(&all_missing, "Dados", 1),
            Err(StatsError::NoObservations { .. })
        ));
    }
}
