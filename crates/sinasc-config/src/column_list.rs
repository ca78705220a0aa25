//! Plain-text column lists, one name per line.

use std::path::Path;

use crate::error::{ConfigError, Result};

/// Read a column list file.
///
/// Surrounding whitespace is trimmed and blank lines are skipped. Order is
/// kept and duplicates are not removed.
pub fn read_column_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}
