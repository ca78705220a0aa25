//! Scalar and cell value types.
//!
//! [`ScalarValue`] is what a rule file can hold (allowed categorical values,
//! fixed fill constants). [`CellValue`] is a decoded frame cell; operations
//! that rewrite a column collect its cells, edit them, and rebuild the column
//! with [`build_column`], which picks the narrowest dtype that holds every cell.

use std::fmt;

use polars::prelude::{AnyValue, Column, NamedFrom};
use serde::{Deserialize, Serialize};

use crate::polars::format_numeric;

/// A configured constant: integer, float or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Numeric view of the value; text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => crate::polars::parse_f64(s),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Cell carrying this value.
    pub fn to_cell(&self) -> CellValue {
        match self {
            Self::Int(v) => CellValue::Int(*v),
            Self::Float(v) => CellValue::Float(*v),
            Self::Text(s) => CellValue::Text(s.clone()),
        }
    }

    /// Whether `cell` equals this value.
    ///
    /// Numeric cells compare numerically against numeric values; every other
    /// pairing compares text forms. Missing cells never match.
    pub fn matches(&self, cell: &CellValue) -> bool {
        match (cell, self) {
            (CellValue::Missing, _) => false,
            (CellValue::Int(_) | CellValue::Float(_), Self::Int(_) | Self::Float(_)) => {
                cell.as_number() == self.as_f64()
            }
            _ => cell.to_text().trim() == self.to_string().trim(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_numeric(*v)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A single decoded frame cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Missing,
            AnyValue::Boolean(b) => Self::Int(i64::from(b)),
            AnyValue::Int8(v) => Self::Int(i64::from(v)),
            AnyValue::Int16(v) => Self::Int(i64::from(v)),
            AnyValue::Int32(v) => Self::Int(i64::from(v)),
            AnyValue::Int64(v) => Self::Int(v),
            AnyValue::UInt8(v) => Self::Int(i64::from(v)),
            AnyValue::UInt16(v) => Self::Int(i64::from(v)),
            AnyValue::UInt32(v) => Self::Int(i64::from(v)),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(v) => Self::Int(v),
                Err(_) => Self::Float(v as f64),
            },
            AnyValue::Float32(v) => Self::from_float(f64::from(v)),
            AnyValue::Float64(v) => Self::from_float(v),
            AnyValue::String(s) => Self::Text(s.to_string()),
            AnyValue::StringOwned(s) => Self::Text(s.to_string()),
            other => Self::Text(other.to_string()),
        }
    }

    fn from_float(v: f64) -> Self {
        if v.is_nan() {
            Self::Missing
        } else {
            Self::Float(v)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric value of an Int or Float cell. Text is not parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Missing | Self::Text(_) => None,
        }
    }

    /// Numeric value with text parsed; unparseable text is `None`.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Self::Text(s) => crate::polars::parse_f64(s),
            other => other.as_number(),
        }
    }

    /// Text form used for output and for text comparisons.
    pub fn to_text(&self) -> String {
        match self {
            Self::Missing => String::new(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => format_numeric(*v),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Rebuild a column from cells.
///
/// All-integer cells give Int64, all-numeric cells Float64, anything else a
/// String column (numbers rendered as text). A column with no present cell
/// is Float64, the way an all-empty column reads from CSV.
pub fn build_column(name: &str, cells: Vec<CellValue>) -> Column {
    let mut all_int = true;
    let mut all_numeric = true;
    for cell in &cells {
        match cell {
            CellValue::Missing | CellValue::Int(_) => {}
            CellValue::Float(_) => all_int = false,
            CellValue::Text(_) => {
                all_int = false;
                all_numeric = false;
            }
        }
    }

    if all_int && cells.iter().any(|cell| !cell.is_missing()) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| match cell {
                CellValue::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        Column::new(name.into(), values)
    } else if all_numeric {
        let values: Vec<Option<f64>> = cells.iter().map(CellValue::as_number).collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| match cell {
                CellValue::Missing => None,
                other => Some(other.to_text()),
            })
            .collect();
        Column::new(name.into(), values)
    }
}
