//! Descriptive statistics per column and per state.

use polars::prelude::DataFrame;
use serde::Serialize;
use sinasc_common::{CellValue, column_cells};

use crate::error::{Result, StatsError};
use crate::geo::{GeoMapping, filter_by_prefix, geo_codes};

/// Count, mean, sample standard deviation, min, quartiles and max of one
/// column. Statistics of an empty sample are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    Some(sorted[below] + (sorted[above] - sorted[below]) * fraction)
}

impl SummaryStats {
    /// Statistics of `values`; order does not matter.
    pub fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|mean| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });
        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

/// Summary statistics for each of `columns`. Text cells that do not parse
/// as numbers count as missing.
pub fn describe(df: &DataFrame, columns: &[String]) -> Result<Vec<SummaryStats>> {
    columns
        .iter()
        .map(|column| {
            let cells =
                column_cells(df, column).ok_or_else(|| StatsError::column_not_found(column))?;
            let values = cells.iter().filter_map(CellValue::coerce_f64).collect();
            Ok(SummaryStats::from_values(column, values))
        })
        .collect()
}

/// [`describe`] per state, grouping rows by the state prefix of
/// `geo_column`. States without rows are omitted; results are keyed by
/// state abbreviation in table order.
pub fn describe_by_state(
    df: &DataFrame,
    geo_column: &str,
    columns: &[String],
) -> Result<Vec<(String, Vec<SummaryStats>)>> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(StatsError::column_not_found(column));
        }
    }
    let codes = geo_codes(df, geo_column)?;
    let mut result = Vec::new();
    for state in GeoMapping::State.entries() {
        let partition = filter_by_prefix(df, &codes, state.code)?;
        if partition.height() == 0 {
            continue;
        }
        result.push((state.abbreviation.to_string(), describe(&partition, columns)?));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = SummaryStats::from_values("X", vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(2.5));
        let std = stats.std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q25, Some(1.75));
        assert_eq!(stats.q50, Some(2.5));
        assert_eq!(stats.q75, Some(3.25));
        assert_eq!(stats.max, Some(4.0));
    }

    #[test]
    fn small_samples_have_no_spread() {
        let one = SummaryStats::from_values("X", vec![7.0]);
        assert_eq!(one.std, None);
        assert_eq!(one.q75, Some(7.0));

        let none = SummaryStats::from_values("X", Vec::new());
        assert_eq!(none.count, 0);
        assert_eq!(none.mean, None);
        assert_eq!(none.min, None);
    }

    #[test]
    fn describe_coerces_text() {
        let df = DataFrame::new(vec![Column::new("X".into(), vec!["1", "x", "3"])]).unwrap();
        let stats = describe(&df, &["X".to_string()]).unwrap();
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].mean, Some(2.0));
    }

    #[test]
    fn by_state_omits_empty_states() {
        let df = DataFrame::new(vec![
            Column::new("CODMUNNASC".into(), vec![120001i64, 120002, 310620]),
            Column::new("IDADEMAE".into(), vec![20i64, 30, 25]),
        ])
        .unwrap();
        let result = describe_by_state(&df, "CODMUNNASC", &["IDADEMAE".to_string()]).unwrap();
        let states: Vec<&str> = result.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(states, vec!["AC", "MG"]);
        assert_eq!(result[0].1[0].mean, Some(25.0));
        assert_eq!(result[1].1[0].count, 1);

        let err = describe_by_state(&df, "CODMUNNASC", &["PESO".to_string()]).unwrap_err();
        assert!(matches!(err, StatsError::ColumnNotFound { .. }));
    }
}
