//! Missing-value imputation by fixed constant or column mean.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use sinasc_common::{
    CellValue, ErrorPolicy, ScalarValue, build_column, column_cells, is_numeric_dtype,
};
use tracing::{debug, warn};

use crate::error::{CleanError, Result};
use crate::moments::RunningStats;

/// Replace missing values in each named column with its paired constant.
///
/// A text constant in a numeric column (or a number in a text column) turns
/// the column into text.
pub fn fill_fixed(
    df: &DataFrame,
    values: &BTreeMap<String, ScalarValue>,
    policy: ErrorPolicy,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for (column, value) in values {
        if out.column(column).is_err() {
            if policy.is_strict() {
                return Err(CleanError::column_not_found(column));
            }
            warn!(column = %column, "fill column not found; column skipped");
            continue;
        }
        let filled = fill_column(&mut out, column, &value.to_cell())?;
        debug!(column = %column, filled, "filled with constant");
    }
    Ok(out)
}

/// Replace missing values in each named column with that column's mean in
/// `df`.
pub fn fill_mean(df: &DataFrame, columns: &[String], policy: ErrorPolicy) -> Result<DataFrame> {
    fill_mean_with(df, columns, None, policy)
}

/// As [`fill_mean`], using the supplied `means` for the columns they cover.
///
/// A column whose mean is undefined (no observed values) is left as is.
pub fn fill_mean_with(
    df: &DataFrame,
    columns: &[String],
    means: Option<&BTreeMap<String, f64>>,
    policy: ErrorPolicy,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in columns {
        let Ok(series) = out.column(column) else {
            if policy.is_strict() {
                return Err(CleanError::column_not_found(column));
            }
            warn!(column = %column, "mean-fill column not found; column skipped");
            continue;
        };
        if !is_numeric_dtype(series.dtype()) {
            if policy.is_strict() {
                return Err(CleanError::NonNumeric {
                    column: column.clone(),
                });
            }
            warn!(column = %column, "values must be numeric; mean fill skipped");
            continue;
        }

        let mean = match means.and_then(|m| m.get(column)) {
            Some(mean) => Some(*mean),
            None => column_cells(&out, column)
                .unwrap_or_default()
                .iter()
                .filter_map(CellValue::as_number)
                .collect::<RunningStats>()
                .mean(),
        };
        let Some(mean) = mean.filter(|m| m.is_finite()) else {
            debug!(column = %column, "no observed values; mean fill skipped");
            continue;
        };
        let filled = fill_column(&mut out, column, &CellValue::Float(mean))?;
        debug!(column = %column, mean, filled, "filled with mean");
    }
    Ok(out)
}

/// Replace the missing cells of `column` with `fill`, returning how many
/// were replaced.
fn fill_column(df: &mut DataFrame, column: &str, fill: &CellValue) -> Result<usize> {
    let Some(mut cells) = column_cells(df, column) else {
        return Ok(0);
    };
    let mut filled = 0;
    for cell in cells.iter_mut().filter(|cell| cell.is_missing()) {
        *cell = fill.clone();
        filled += 1;
    }
    if filled > 0 {
        df.with_column(build_column(column, cells))?;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{AnyValue, Column, DataType, NamedFrom};

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Q".into(), vec![Some(1i64), None, Some(3)]),
            Column::new("S".into(), vec![Some(38.0f64), None, Some(40.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn fixed_fill_replaces_missing_only() {
        let values = BTreeMap::from([("Q".to_string(), ScalarValue::Int(0))]);
        let filled = fill_fixed(&frame(), &values, ErrorPolicy::Strict).unwrap();
        let q = filled.column("Q").unwrap();
        assert_eq!(q.null_count(), 0);
        assert_eq!(q.dtype(), &DataType::Int64);
        assert_eq!(q.get(0).unwrap(), AnyValue::Int64(1));
        assert_eq!(q.get(1).unwrap(), AnyValue::Int64(0));
        assert_eq!(filled.column("S").unwrap().null_count(), 1);
    }

    #[test]
    fn fixed_fill_with_text_turns_column_into_text() {
        let values = BTreeMap::from([("Q".to_string(), ScalarValue::from("NA"))]);
        let filled = fill_fixed(&frame(), &values, ErrorPolicy::Strict).unwrap();
        let q = filled.column("Q").unwrap();
        assert_eq!(q.dtype(), &DataType::String);
        assert_eq!(q.get(1).unwrap(), AnyValue::String("NA"));
    }

    #[test]
    fn fixed_fill_absent_column_depends_on_policy() {
        let values = BTreeMap::from([("Z".to_string(), ScalarValue::Int(0))]);
        assert!(fill_fixed(&frame(), &values, ErrorPolicy::Permissive).is_ok());
        let err = fill_fixed(&frame(), &values, ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::ColumnNotFound { .. }));
    }

    #[test]
    fn mean_fill_uses_frame_mean() {
        let filled = fill_mean(&frame(), &["S".to_string()], ErrorPolicy::Strict).unwrap();
        let s = filled.column("S").unwrap();
        assert_eq!(s.get(1).unwrap(), AnyValue::Float64(39.0));
    }

    #[test]
    fn mean_fill_prefers_supplied_mean() {
        let means = BTreeMap::from([("Q".to_string(), 10.0)]);
        let filled =
            fill_mean_with(&frame(), &["Q".to_string()], Some(&means), ErrorPolicy::Strict)
                .unwrap();
        let q = filled.column("Q").unwrap();
        assert_eq!(q.dtype(), &DataType::Float64);
        assert_eq!(q.get(1).unwrap(), AnyValue::Float64(10.0));
    }

    #[test]
    fn mean_fill_rejects_text() {
        let df = DataFrame::new(vec![Column::new("T".into(), vec![Some("a"), None])]).unwrap();
        let err = fill_mean(&df, &["T".to_string()], ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::NonNumeric { .. }));
        let kept = fill_mean(&df, &["T".to_string()], ErrorPolicy::Permissive).unwrap();
        assert_eq!(kept.column("T").unwrap().null_count(), 1);
    }
}
