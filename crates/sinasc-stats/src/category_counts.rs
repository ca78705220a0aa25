//! Streaming per-category counts and sums for files too large to load.

use std::path::Path;

use polars::prelude::DataFrame;
use serde::Serialize;
use sinasc_common::{CellValue, column_cells};
use sinasc_ingest::{ChunkOptions, ChunkReader};
use tracing::{debug, info_span};

use crate::error::{Result, StatsError};
use crate::means::{Category, is_category};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub category: Category,
    /// Rows with this category code.
    pub count: u64,
    /// Sum of the observed values in those rows.
    pub sum: f64,
}

impl CategoryTotals {
    /// `sum / count`, `None` for a category with no rows.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Running totals of one value column per category code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCounts {
    pub category_column: String,
    pub value_column: String,
    pub totals: Vec<CategoryTotals>,
}

impl CategoryCounts {
    pub fn new(category_column: &str, value_column: &str, categories: &[Category]) -> Self {
        Self {
            category_column: category_column.to_string(),
            value_column: value_column.to_string(),
            totals: categories
                .iter()
                .map(|category| CategoryTotals {
                    category: *category,
                    count: 0,
                    sum: 0.0,
                })
                .collect(),
        }
    }

    /// Add the rows of one frame.
    pub fn add_frame(&mut self, df: &DataFrame) -> Result<()> {
        let keys = column_cells(df, &self.category_column)
            .ok_or_else(|| StatsError::column_not_found(&self.category_column))?;
        let values = column_cells(df, &self.value_column)
            .ok_or_else(|| StatsError::column_not_found(&self.value_column))?;

        for (key, value) in keys.iter().zip(&values) {
            if let Some(totals) = self
                .totals
                .iter_mut()
                .find(|totals| is_category(key, totals.category.code))
            {
                totals.count += 1;
                totals.sum += value.coerce_f64().unwrap_or(0.0);
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.totals.iter_mut().zip(&other.totals) {
            mine.count += theirs.count;
            mine.sum += theirs.sum;
        }
    }
}

/// Stream `path` chunk by chunk, accumulating `value_column` totals per
/// code of `category_column`. Only one chunk is held in memory.
pub fn accumulate_category_totals(
    path: &Path,
    category_column: &str,
    value_column: &str,
    categories: &[Category],
    options: ChunkOptions,
) -> Result<CategoryCounts> {
    let span = info_span!("category_totals", path = %path.display(), category_column, value_column);
    let _guard = span.enter();

    let mut counts = CategoryCounts::new(category_column, value_column, categories);
    for (index, chunk) in ChunkReader::open(path, options)?.enumerate() {
        let chunk = chunk?;
        counts.add_frame(&chunk)?;
        debug!(chunk = index, rows = chunk.height(), "accumulated chunk");
    }
    Ok(counts)
}
