//! Column means per categorical code, optionally per state.

use polars::prelude::DataFrame;
use serde::Serialize;
use sinasc_common::{CellValue, column_cells};

use crate::error::{Result, StatsError};
use crate::geo::{GeoMapping, filter_by_prefix, geo_codes};

/// A categorical code and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub code: i64,
    pub label: &'static str,
}

/// Race/colour codes of RACACOR and RACACORMAE.
pub static RACE_CATEGORIES: [Category; 5] = [
    Category {
        code: 1,
        label: "Branca",
    },
    Category {
        code: 2,
        label: "Preta",
    },
    Category {
        code: 3,
        label: "Amarela",
    },
    Category {
        code: 4,
        label: "Parda",
    },
    Category {
        code: 5,
        label: "Indígena",
    },
];

/// Means of the requested columns for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMeans {
    pub category: Category,
    /// `(column, mean)` in request order; `None` when nothing was observed.
    pub means: Vec<(String, Option<f64>)>,
}

/// Whether `cell` holds `code`, comparing trimmed text forms.
pub(crate) fn is_category(cell: &CellValue, code: i64) -> bool {
    !cell.is_missing() && cell.to_text().trim() == code.to_string()
}

/// Mean of each of `columns` over the rows whose `category_column` equals
/// each category code. Non-numeric cells count as missing.
pub fn mean_by_category(
    df: &DataFrame,
    category_column: &str,
    columns: &[String],
    categories: &[Category],
) -> Result<Vec<CategoryMeans>> {
    let keys = column_cells(df, category_column)
        .ok_or_else(|| StatsError::column_not_found(category_column))?;
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let cells = column_cells(df, column).ok_or_else(|| StatsError::column_not_found(column))?;
        values.push(cells.iter().map(CellValue::coerce_f64).collect::<Vec<_>>());
    }

    Ok(categories
        .iter()
        .map(|category| {
            let means = columns
                .iter()
                .zip(&values)
                .map(|(column, column_values)| {
                    let (sum, count) = keys
                        .iter()
                        .zip(column_values)
                        .filter(|(key, _)| is_category(key, category.code))
                        .filter_map(|(_, value)| *value)
                        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                    (column.clone(), (count > 0).then(|| sum / count as f64))
                })
                .collect();
            CategoryMeans {
                category: *category,
                means,
            }
        })
        .collect())
}

/// [`mean_by_category`] for each of the 27 states in table order, states
/// without rows included (their means are all `None`).
pub fn mean_by_state_and_category(
    df: &DataFrame,
    geo_column: &str,
    category_column: &str,
    columns: &[String],
    categories: &[Category],
) -> Result<Vec<(String, Vec<CategoryMeans>)>> {
    let codes = geo_codes(df, geo_column)?;
    GeoMapping::State
        .entries()
        .iter()
        .map(|state| {
            let partition = filter_by_prefix(df, &codes, state.code)?;
            Ok((
                state.abbreviation.to_string(),
                mean_by_category(&partition, category_column, columns, categories)?,
            ))
        })
        .collect()
}
