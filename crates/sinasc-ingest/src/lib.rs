//! SINASC table ingestion.
//!
//! Source extracts are large `;`-delimited files of uncertain encoding. This
//! crate streams them as bounded Polars `DataFrame` chunks and writes the
//! cleaned result back out incrementally.
//!
//! # Example
//!
//! ```ignore
//! use sinasc_ingest::{ChunkOptions, ChunkReader, CleanedTableWriter};
//!
//! let reader = ChunkReader::open("DNBR2020.csv", ChunkOptions::default())?;
//! let mut writer = CleanedTableWriter::new("cleaned.csv");
//! for chunk in reader {
//!     writer.append(&chunk?)?;
//! }
//! writer.finish()?;
//! ```

mod decode;
mod error;
mod reader;
mod writer;

// === Error Types ===
pub use error::{IngestError, Result};

// === Reading ===
pub use reader::{ChunkOptions, ChunkReader, DEFAULT_CHUNK_ROWS, read_table};

// === Writing ===
pub use writer::CleanedTableWriter;
