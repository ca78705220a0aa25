//! Structural per-chunk stages: index placement, duplicate and missing-row
//! removal, column removal and the integer cast.
//!
//! The optional `index` argument names the row identifier column. It is
//! carried through every stage but never takes part in the row comparisons
//! or the cast.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::{BooleanChunked, Column, DataFrame, NamedFrom, NewChunkedArray};
use sinasc_common::{CellValue, column_cells, column_names};
use tracing::{debug, warn};

use crate::error::Result;

/// Move `column` to the front of the frame.
///
/// Returns the frame and whether the index is in place; an absent column is
/// logged and the frame is returned unchanged.
pub fn set_index(df: &DataFrame, column: &str) -> Result<(DataFrame, bool)> {
    let names = column_names(df);
    if !names.iter().any(|name| name == column) {
        warn!(column = %column, "index column not found; continuing without row identifier");
        return Ok((df.clone(), false));
    }
    let mut order = Vec::with_capacity(names.len());
    order.push(column.to_string());
    order.extend(names.into_iter().filter(|name| name != column));
    Ok((df.select(order)?, true))
}

fn data_columns(df: &DataFrame, index: Option<&str>) -> Vec<String> {
    column_names(df)
        .into_iter()
        .filter(|name| Some(name.as_str()) != index)
        .collect()
}

fn row_cells(df: &DataFrame, columns: &[String]) -> Vec<Vec<CellValue>> {
    columns
        .iter()
        .filter_map(|name| column_cells(df, name))
        .collect()
}

/// Drop rows equal to an earlier row on every non-index column.
pub fn drop_duplicates(df: &DataFrame, index: Option<&str>) -> Result<DataFrame> {
    let columns = data_columns(df, index);
    let cells = row_cells(df, &columns);

    let mut seen = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    let mut key = String::new();
    for row in 0..df.height() {
        key.clear();
        for column in &cells {
            // The tag keeps a text "1" distinct from the integer 1.
            match &column[row] {
                CellValue::Missing => key.push('\u{0}'),
                CellValue::Int(v) => {
                    key.push('i');
                    key.push_str(&v.to_string());
                }
                CellValue::Float(v) => {
                    key.push('f');
                    // -0.0 == 0.0
                    let v = if *v == 0.0 { 0.0 } else { *v };
                    key.push_str(&v.to_string());
                }
                CellValue::Text(s) => {
                    key.push('s');
                    key.push_str(s);
                }
            }
            key.push('\u{1f}');
        }
        keep.push(seen.insert(key.clone()));
    }

    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    let out = df.filter(&mask)?;
    debug!(removed = df.height() - out.height(), "dropped duplicate rows");
    Ok(out)
}

/// Drop the named columns; names not in the frame are ignored.
pub fn drop_columns(df: &DataFrame, columns: &BTreeSet<String>) -> DataFrame {
    let mut out = df.clone();
    let mut dropped = 0;
    for column in columns {
        if let Ok(next) = out.drop(column) {
            out = next;
            dropped += 1;
        }
    }
    debug!(dropped, "dropped configured columns");
    out
}

/// Drop rows with a missing value in any of `columns`.
///
/// When any listed column is absent the whole step is skipped with a
/// warning and the frame is returned unchanged.
pub fn drop_missing(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let absent: Vec<&String> = columns
        .iter()
        .filter(|name| df.column(name).is_err())
        .collect();
    if !absent.is_empty() {
        warn!(columns = ?absent, "dropna columns not found; step skipped");
        return Ok(df.clone());
    }
    drop_rows_with_missing(df, columns)
}

/// Drop rows with a missing value in any non-index column.
pub fn drop_incomplete_rows(df: &DataFrame, index: Option<&str>) -> Result<DataFrame> {
    drop_rows_with_missing(df, &data_columns(df, index))
}

fn drop_rows_with_missing(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let cells = row_cells(df, columns);
    let keep: Vec<bool> = (0..df.height())
        .map(|row| cells.iter().all(|column| !column[row].is_missing()))
        .collect();
    let mask = BooleanChunked::from_slice("complete".into(), &keep);
    let out = df.filter(&mask)?;
    debug!(removed = df.height() - out.height(), "dropped rows with missing values");
    Ok(out)
}

fn cell_to_i32(cell: &CellValue) -> Option<Option<i32>> {
    let range = f64::from(i32::MIN)..=f64::from(i32::MAX);
    let truncated = |v: f64| {
        let v = v.trunc();
        range.contains(&v).then_some(v as i32)
    };
    match cell {
        CellValue::Missing => Some(None),
        CellValue::Int(v) => i32::try_from(*v).ok().map(Some),
        CellValue::Float(v) => truncated(*v).map(Some),
        CellValue::Text(s) => sinasc_common::parse_f64(s).and_then(truncated).map(Some),
    }
}

/// Cast every non-index column to Int32.
///
/// The cast is all-or-nothing: if any cell is not representable (text that
/// is not a number, a value outside the i32 range, a non-finite float) a
/// warning is logged and the frame is returned with its original values.
/// Floats truncate toward zero.
pub fn cast_int32(df: &DataFrame, index: Option<&str>) -> Result<DataFrame> {
    let mut casted: Vec<Column> = Vec::new();
    for name in data_columns(df, index) {
        let cells = column_cells(df, &name).unwrap_or_default();
        let mut values: Vec<Option<i32>> = Vec::with_capacity(cells.len());
        for (row, cell) in cells.iter().enumerate() {
            match cell_to_i32(cell) {
                Some(value) => values.push(value),
                None => {
                    warn!(
                        column = %name,
                        row,
                        value = %cell.to_text(),
                        "cannot cast to 32-bit integer; chunk keeps original values"
                    );
                    return Ok(df.clone());
                }
            }
        }
        casted.push(Column::new(name.as_str().into(), values));
    }

    let mut out = df.clone();
    for column in casted {
        out.with_column(column)?;
    }
    Ok(out)
}
