//! Categorical restriction filter.

use std::collections::BTreeMap;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use sinasc_common::{ErrorPolicy, ScalarValue, column_cells};
use tracing::{debug, warn};

use crate::error::{CleanError, Result};

/// Keep only rows whose value in each restricted column is one of the
/// allowed values.
///
/// Missing cells never match. Columns absent from `df` are skipped with a
/// warning under [`ErrorPolicy::Permissive`] and fail with
/// [`CleanError::ColumnNotFound`] under [`ErrorPolicy::Strict`]. Every
/// restriction only removes rows, so the order of evaluation does not
/// matter and applying the same restrictions twice changes nothing.
pub fn filter_rows(
    df: &DataFrame,
    restrictions: &BTreeMap<String, Vec<ScalarValue>>,
    policy: ErrorPolicy,
) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for (column, allowed) in restrictions {
        let Some(cells) = column_cells(df, column) else {
            if policy.is_strict() {
                return Err(CleanError::column_not_found(column));
            }
            warn!(column = %column, "restricted column not found; restriction skipped");
            continue;
        };
        for (flag, cell) in keep.iter_mut().zip(&cells) {
            if *flag && !allowed.iter().any(|value| value.matches(cell)) {
                *flag = false;
            }
        }
    }

    let kept = keep.iter().filter(|flag| **flag).count();
    debug!(rows = df.height(), kept, "applied restrictions");
    let mask = BooleanChunked::from_slice("restrictions".into(), &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    fn restrictions(entries: &[(&str, &[i64])]) -> BTreeMap<String, Vec<ScalarValue>> {
        entries
            .iter()
            .map(|(column, allowed)| {
                (
                    (*column).to_string(),
                    allowed.iter().map(|v| ScalarValue::Int(*v)).collect(),
                )
            })
            .collect()
    }

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::new("A".into(), vec![1i64, 1, 2, 2]),
            Column::new("B".into(), vec![4i64, 5, 4, 5]),
        ])
        .unwrap()
    }

    #[test]
    fn keeps_only_allowed_values() {
        let filtered =
            filter_rows(&sample(), &restrictions(&[("A", &[2])]), ErrorPolicy::Strict).unwrap();
        let expected = DataFrame::new(vec![
            Column::new("A".into(), vec![2i64, 2]),
            Column::new("B".into(), vec![4i64, 5]),
        ])
        .unwrap();
        assert!(filtered.equals(&expected));
    }

    #[test]
    fn missing_cells_never_match() {
        let df = DataFrame::new(vec![Column::new("A".into(), vec![Some(1i64), None, Some(2)])])
            .unwrap();
        let filtered =
            filter_rows(&df, &restrictions(&[("A", &[1, 2])]), ErrorPolicy::Strict).unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn absent_column_depends_on_policy() {
        let rules = restrictions(&[("Z", &[1]), ("A", &[1])]);
        let lenient = filter_rows(&sample(), &rules, ErrorPolicy::Permissive).unwrap();
        assert_eq!(lenient.height(), 2);

        let err = filter_rows(&sample(), &rules, ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::ColumnNotFound { column } if column == "Z"));
    }

    #[test]
    fn text_values_compare_as_text() {
        let df = DataFrame::new(vec![Column::new("SEXO".into(), vec!["M", "F", "I"])]).unwrap();
        let rules = BTreeMap::from([(
            "SEXO".to_string(),
            vec![ScalarValue::from("M"), ScalarValue::from("F")],
        )]);
        let filtered = filter_rows(&df, &rules, ErrorPolicy::Strict).unwrap();
        assert_eq!(filtered.height(), 2);
    }
}
