//! Incremental writer for the cleaned table.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use sinasc_common::{CellValue, column_cells, column_names};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Appends cleaned chunks to a `;`-delimited UTF-8 file.
///
/// The first append creates (or truncates) the file and writes the header
/// taken from that chunk. Later appends write rows only, in the first
/// chunk's column order: columns a later chunk lacks are written empty and
/// columns it adds are dropped.
#[derive(Debug)]
pub struct CleanedTableWriter {
    path: PathBuf,
    delimiter: u8,
    header: Option<Vec<String>>,
    rows_written: usize,
}

impl CleanedTableWriter {
    /// Writer targeting `path`. Nothing is touched until the first append.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b';',
            header: None,
            rows_written: 0,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Header fixed by the first append.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Append the rows of `df`.
    pub fn append(&mut self, df: &DataFrame) -> Result<()> {
        let (file, header, write_header) = match &self.header {
            Some(header) => (self.open_append()?, header.clone(), false),
            None => (self.create()?, column_names(df), true),
        };

        let extra: Vec<String> = column_names(df)
            .into_iter()
            .filter(|name| !header.contains(name))
            .collect();
        if !extra.is_empty() {
            warn!(
                path = %self.path.display(),
                columns = ?extra,
                "chunk has columns not present in the output header; dropped"
            );
        }

        let cells: Vec<Option<Vec<CellValue>>> =
            header.iter().map(|name| column_cells(df, name)).collect();

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);
        if write_header {
            writer.write_record(&header).map_err(|e| self.csv_error(e))?;
        }

        let mut record: Vec<String> = Vec::with_capacity(header.len());
        for row in 0..df.height() {
            record.clear();
            for column in &cells {
                let text = column
                    .as_ref()
                    .and_then(|column| column.get(row))
                    .map(CellValue::to_text)
                    .unwrap_or_default();
                record.push(text);
            }
            writer.write_record(&record).map_err(|e| self.csv_error(e))?;
        }
        writer.flush().map_err(|e| self.write_error(e))?;

        self.rows_written += df.height();
        if write_header {
            self.header = Some(header);
        }
        debug!(path = %self.path.display(), rows = df.height(), "appended chunk");
        Ok(())
    }

    /// Finish writing and return the number of data rows written.
    ///
    /// When nothing was appended an empty file is created, so the output
    /// always exists after a run.
    pub fn finish(self) -> Result<usize> {
        if self.header.is_none() {
            self.create()?;
        }
        Ok(self.rows_written)
    }

    fn create(&self) -> Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        File::create(&self.path).map_err(|e| self.write_error(e))
    }

    fn open_append(&self) -> Result<File> {
        OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: std::io::Error) -> IngestError {
        IngestError::FileWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> IngestError {
        IngestError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}
