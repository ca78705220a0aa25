//! Streaming reader yielding bounded `DataFrame` chunks.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{Column, DataFrame};
use tracing::{debug, warn};

use crate::decode::{decode_headers, decode_value, infer_column};
use crate::error::{IngestError, Result};

/// Rows per chunk when none is configured.
pub const DEFAULT_CHUNK_ROWS: usize = 100_000;

/// Options for chunked CSV reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Maximum rows per yielded frame.
    pub chunk_size: usize,
    /// Field delimiter byte. Registry extracts use `;`.
    pub delimiter: u8,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_ROWS,
            delimiter: b';',
        }
    }
}

impl ChunkOptions {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Iterator over the rows of a delimited file, `chunk_size` rows at a time.
///
/// Only one chunk is held in memory. Short records are padded with missing
/// values; fields beyond the header width are ignored.
pub struct ChunkReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    headers: Vec<String>,
    chunk_size: usize,
    chunks_read: usize,
    rows_read: usize,
    warned_wide: bool,
    done: bool,
}

impl ChunkReader {
    /// Open `path` and read its header row.
    pub fn open(path: impl AsRef<Path>, options: ChunkOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if options.chunk_size == 0 {
            return Err(IngestError::InvalidChunkSize);
        }

        let file = File::open(&path).map_err(|e| IngestError::open(&path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(file);

        let header_record = reader.byte_headers().map_err(|source| IngestError::Csv {
            path: path.clone(),
            source,
        })?;
        let headers = decode_headers(header_record.iter());
        if headers.iter().all(String::is_empty) {
            return Err(IngestError::MissingHeader { path });
        }

        debug!(path = %path.display(), columns = headers.len(), "opened source table");
        Ok(Self {
            path,
            reader,
            headers,
            chunk_size: options.chunk_size,
            chunks_read: 0,
            rows_read: 0,
            warned_wide: false,
            done: false,
        })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows yielded so far.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_chunk(&mut self) -> Result<Option<DataFrame>> {
        let width = self.headers.len();
        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut record = csv::ByteRecord::new();
        let mut rows = 0usize;

        while rows < self.chunk_size {
            let more = self
                .reader
                .read_byte_record(&mut record)
                .map_err(|source| IngestError::Csv {
                    path: self.path.clone(),
                    source,
                })?;
            if !more {
                self.done = true;
                break;
            }
            if record.len() > width && !self.warned_wide {
                warn!(
                    path = %self.path.display(),
                    line = self.rows_read + rows + 2,
                    fields = record.len(),
                    columns = width,
                    "record has more fields than the header; extra fields ignored"
                );
                self.warned_wide = true;
            }
            for (idx, column) in values.iter_mut().enumerate() {
                column.push(record.get(idx).and_then(decode_value));
            }
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }

        let columns: Vec<Column> = self
            .headers
            .iter()
            .zip(values)
            .map(|(name, column)| infer_column(name, column))
            .collect();
        let df = DataFrame::new(columns)?;

        self.rows_read += rows;
        self.chunks_read += 1;
        debug!(chunk = self.chunks_read, rows, "read chunk");
        Ok(Some(df))
    }

    /// Empty frame carrying the header columns.
    pub fn empty_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .headers
            .iter()
            .map(|name| infer_column(name, Vec::new()))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

impl Iterator for ChunkReader {
    type Item = Result<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(df)) => Some(Ok(df)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Read a whole table into one frame.
///
/// Used for the cleaned table before aggregation. dtypes are inferred over
/// every row at once. A header-only file gives a frame with no rows.
pub fn read_table(path: impl AsRef<Path>, options: ChunkOptions) -> Result<DataFrame> {
    let mut reader = ChunkReader::open(path, options.with_chunk_size(usize::MAX))?;
    match reader.next() {
        Some(chunk) => chunk,
        None => reader.empty_frame(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ChunkOptions::default()
            .with_chunk_size(10)
            .with_delimiter(b',');
        assert_eq!(options.chunk_size, 10);
        assert_eq!(options.delimiter, b',');
        assert_eq!(ChunkOptions::default().delimiter, b';');
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = ChunkReader::open("unused.csv", ChunkOptions::default().with_chunk_size(0));
        assert!(matches!(result, Err(IngestError::InvalidChunkSize)));
    }
}
