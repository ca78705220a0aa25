//! Z-score outlier rejection.

use std::collections::BTreeMap;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use sinasc_common::{CellValue, ErrorPolicy, column_cells, is_numeric_dtype};
use tracing::{debug, warn};

use crate::error::{CleanError, Result};
use crate::moments::{ColumnMoments, RunningStats};

/// Reject rows whose z-score reaches `limit` in any of `columns`.
///
/// Moments are computed once over the whole of `df` before any row is
/// removed: `z = (mean - value) / std` with the sample standard deviation.
/// A row survives when `|z| < limit` for every column. Missing cells are
/// never outliers, and a column with zero spread scores zero everywhere.
///
/// A requested column with text values fails with
/// [`CleanError::NonNumeric`] under [`ErrorPolicy::Strict`]; under
/// [`ErrorPolicy::Permissive`] the diagnostic is logged and an empty frame
/// with the same columns is returned.
pub fn filter_by_zscore(
    df: &DataFrame,
    columns: &[String],
    limit: f64,
    policy: ErrorPolicy,
) -> Result<DataFrame> {
    filter_by_zscore_with(df, columns, limit, None, policy)
}

/// As [`filter_by_zscore`], scoring with precomputed `moments` for the
/// columns they cover instead of moments taken from `df`.
pub fn filter_by_zscore_with(
    df: &DataFrame,
    columns: &[String],
    limit: f64,
    moments: Option<&BTreeMap<String, ColumnMoments>>,
    policy: ErrorPolicy,
) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for column in columns {
        let Ok(series) = df.column(column) else {
            if policy.is_strict() {
                return Err(CleanError::column_not_found(column));
            }
            warn!(column = %column, "z-score column not found; column skipped");
            continue;
        };
        if !is_numeric_dtype(series.dtype()) {
            if policy.is_strict() {
                return Err(CleanError::NonNumeric {
                    column: column.clone(),
                });
            }
            warn!(
                column = %column,
                dtype = %series.dtype(),
                "values must be numeric; returning an empty table"
            );
            return Ok(df.slice(0, 0));
        }

        let cells = column_cells(df, column).unwrap_or_default();
        let scoring = match moments.and_then(|m| m.get(column)) {
            Some(moments) => *moments,
            None => cells
                .iter()
                .filter_map(CellValue::as_number)
                .collect::<RunningStats>()
                .moments(),
        };

        for (flag, cell) in keep.iter_mut().zip(&cells) {
            if let Some(value) = cell.as_number()
                && scoring.z_score(value).abs() >= limit
            {
                *flag = false;
            }
        }
    }

    let kept = keep.iter().filter(|flag| **flag).count();
    debug!(rows = df.height(), kept, limit, "applied z-score filter");
    let mask = BooleanChunked::from_slice("zscore".into(), &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{AnyValue, Column, NamedFrom};

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn rejects_far_outlier() {
        let df = DataFrame::new(vec![Column::new("X".into(), vec![1i64, 2, 3, 4, 100])]).unwrap();
        let filtered = filter_by_zscore(&df, &names(&["X"]), 1.0, ErrorPolicy::Strict).unwrap();
        assert_eq!(filtered.height(), 4);
        let x = filtered.column("X").unwrap();
        for idx in 0..4 {
            assert_ne!(x.get(idx).unwrap(), AnyValue::Int64(100));
        }
    }

    #[test]
    fn constant_column_keeps_every_row() {
        let df = DataFrame::new(vec![Column::new("X".into(), vec![7i64, 7, 7])]).unwrap();
        let filtered = filter_by_zscore(&df, &names(&["X"]), 0.5, ErrorPolicy::Strict).unwrap();
        assert_eq!(filtered.height(), 3);
    }

    #[test]
    fn missing_cells_are_not_outliers() {
        let df = DataFrame::new(vec![Column::new(
            "X".into(),
            vec![Some(1.0f64), None, Some(1.0), Some(1.0)],
        )])
        .unwrap();
        let filtered = filter_by_zscore(&df, &names(&["X"]), 1.0, ErrorPolicy::Strict).unwrap();
        assert_eq!(filtered.height(), 4);
    }

    #[test]
    fn text_column_depends_on_policy() {
        let df = DataFrame::new(vec![
            Column::new("X".into(), vec!["a", "b"]),
            Column::new("Y".into(), vec![1i64, 2]),
        ])
        .unwrap();

        let err = filter_by_zscore(&df, &names(&["X"]), 1.0, ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::NonNumeric { .. }));

        let empty = filter_by_zscore(&df, &names(&["X"]), 1.0, ErrorPolicy::Permissive).unwrap();
        assert_eq!(empty.height(), 0);
        assert_eq!(empty.width(), 2);
    }

    #[test]
    fn precomputed_moments_take_precedence() {
        let df = DataFrame::new(vec![Column::new("X".into(), vec![10.0f64, 11.0])]).unwrap();
        let moments = BTreeMap::from([(
            "X".to_string(),
            ColumnMoments {
                count: 100,
                mean: 0.0,
                std: Some(1.0),
            },
        )]);
        let filtered =
            filter_by_zscore_with(&df, &names(&["X"]), 4.0, Some(&moments), ErrorPolicy::Strict)
                .unwrap();
        assert_eq!(filtered.height(), 0);
    }
}
