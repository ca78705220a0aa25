//! The chunked cleaning pipeline.
//!
//! Each chunk goes through eleven stages in a fixed order:
//!
//! 1. move the index column to the front
//! 2. drop duplicate rows
//! 3. drop `columns_to_remove`
//! 4. drop rows missing any of `columns_to_dropna`
//! 5. mean-fill `columns_to_fill_mean`
//! 6. drop rows with any missing value
//! 7. cast to 32-bit integers (all-or-nothing)
//! 8. apply `restrictions`
//! 9. fill `columns_to_fill_values`
//! 10. reject z-score outliers
//! 11. append to the output
//!
//! Stage 9 runs after stage 6 has removed every incomplete row, so in a full
//! run it finds nothing to fill. It is kept in place so that rule files keep
//! their established meaning.
//!
//! With [`StatisticsScope::Global`] the input is read up to three times:
//! stages 1-4 to accumulate the means used by stage 5, stages 1-9 to
//! accumulate the moments used by stage 10, and finally the full run.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::DataFrame;
use sinasc_common::{CellValue, ErrorPolicy, column_cells, is_numeric_dtype};
use sinasc_config::{RuleConfig, StatisticsScope};
use sinasc_ingest::{ChunkOptions, ChunkReader, CleanedTableWriter};
use tracing::{debug, info, info_span};

use crate::error::{CleanError, Result};
use crate::filter::filter_rows;
use crate::impute::{fill_fixed, fill_mean_with};
use crate::moments::{ColumnMoments, ColumnStats, RunningStats};
use crate::outlier::filter_by_zscore_with;
use crate::stages::{
    cast_int32, drop_columns, drop_duplicates, drop_incomplete_rows, drop_missing, set_index,
};

/// Run-level options that are not part of the rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Policy for configured columns absent from a chunk and for
    /// non-numeric data in numeric stages.
    pub policy: ErrorPolicy,
    /// Field delimiter of the input.
    pub delimiter: u8,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::Permissive,
            delimiter: b';',
        }
    }
}

impl CleanOptions {
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Whole-file statistics replacing the per-chunk ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalStatistics {
    /// Means used by the mean-fill stage.
    pub means: BTreeMap<String, f64>,
    /// Moments used by the z-score stage.
    pub moments: BTreeMap<String, ColumnMoments>,
}

/// Counts from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub chunks: usize,
    pub rows_read: usize,
    pub rows_written: usize,
    /// Times the input was read, preparatory passes included.
    pub passes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Through {
    DropMissing,
    FillFixed,
    All,
}

/// Clean `input` into `output` with the default options.
pub fn clean(input: &Path, output: &Path, config: &RuleConfig) -> Result<CleanReport> {
    clean_with(input, output, config, CleanOptions::default())
}

/// Clean `input` into `output`.
///
/// The input is streamed in chunks of `config.chunk_size` rows; only one
/// chunk is in memory at a time. Chunks already appended stay in the output
/// if a later chunk fails.
pub fn clean_with(
    input: &Path,
    output: &Path,
    config: &RuleConfig,
    options: CleanOptions,
) -> Result<CleanReport> {
    let problems = config.problems();
    if !problems.is_empty() {
        return Err(CleanError::InvalidRules {
            message: problems.join("; "),
        });
    }

    let span = info_span!("clean", input = %input.display(), output = %output.display());
    let _guard = span.enter();

    let chunk_options = ChunkOptions::default()
        .with_chunk_size(config.chunk_size)
        .with_delimiter(options.delimiter);
    let mut report = CleanReport::default();

    let global = match config.statistics_scope {
        StatisticsScope::PerChunk => None,
        StatisticsScope::Global => {
            let mut global = GlobalStatistics::default();
            if !config.columns_to_fill_mean.is_empty() {
                let stats = accumulate(
                    input,
                    chunk_options,
                    config,
                    options.policy,
                    &global,
                    Through::DropMissing,
                    &config.columns_to_fill_mean,
                )?;
                global.means = stats
                    .iter()
                    .filter_map(|(column, stats)| stats.mean().map(|mean| (column.clone(), mean)))
                    .collect();
                report.passes += 1;
                debug!(means = ?global.means, "accumulated global means");
            }
            if !config.columns_to_filter_by_zscore.is_empty() {
                let stats = accumulate(
                    input,
                    chunk_options,
                    config,
                    options.policy,
                    &global,
                    Through::FillFixed,
                    &config.columns_to_filter_by_zscore,
                )?;
                global.moments = stats
                    .iter()
                    .map(|(column, stats)| (column.clone(), stats.moments()))
                    .collect();
                report.passes += 1;
                debug!(moments = ?global.moments, "accumulated global moments");
            }
            Some(global)
        }
    };

    let reader = ChunkReader::open(input, chunk_options)?;
    let mut writer = CleanedTableWriter::new(output);
    for (index, chunk) in reader.enumerate() {
        let chunk = chunk?;
        let chunk_span = info_span!("chunk", index);
        let _chunk_guard = chunk_span.enter();

        let cleaned = clean_chunk(&chunk, config, options.policy, global.as_ref())?;
        debug!(rows_in = chunk.height(), rows_out = cleaned.height(), "chunk cleaned");
        writer.append(&cleaned)?;

        report.chunks += 1;
        report.rows_read += chunk.height();
    }
    report.rows_written = writer.finish()?;
    report.passes += 1;

    info!(
        chunks = report.chunks,
        rows_read = report.rows_read,
        rows_written = report.rows_written,
        passes = report.passes,
        "cleaning complete"
    );
    Ok(report)
}

/// Run stages 1-10 on one chunk.
///
/// With `global` set, the mean-fill and z-score stages use the supplied
/// whole-file statistics; otherwise each uses the chunk's own.
pub fn clean_chunk(
    df: &DataFrame,
    config: &RuleConfig,
    policy: ErrorPolicy,
    global: Option<&GlobalStatistics>,
) -> Result<DataFrame> {
    run_stages(df, config, policy, global, Through::All)
}

fn run_stages(
    df: &DataFrame,
    config: &RuleConfig,
    policy: ErrorPolicy,
    global: Option<&GlobalStatistics>,
    through: Through,
) -> Result<DataFrame> {
    let (mut frame, indexed) = match config.index_column.as_deref() {
        Some(column) => set_index(df, column)?,
        None => (df.clone(), false),
    };
    let index = if indexed {
        config.index_column.as_deref()
    } else {
        None
    };

    frame = drop_duplicates(&frame, index)?;
    frame = drop_columns(&frame, &config.columns_to_remove);
    if !config.columns_to_dropna.is_empty() {
        frame = drop_missing(&frame, &config.columns_to_dropna)?;
    }
    if through == Through::DropMissing {
        return Ok(frame);
    }

    frame = fill_mean_with(
        &frame,
        &config.columns_to_fill_mean,
        global.map(|g| &g.means),
        policy,
    )?;
    frame = drop_incomplete_rows(&frame, index)?;
    frame = cast_int32(&frame, index)?;
    frame = filter_rows(&frame, &config.restrictions, policy)?;
    frame = fill_fixed(&frame, &config.columns_to_fill_values, policy)?;
    if through == Through::FillFixed {
        return Ok(frame);
    }

    filter_by_zscore_with(
        &frame,
        &config.columns_to_filter_by_zscore,
        config.zscore_limit,
        global.map(|g| &g.moments),
        policy,
    )
}

/// Read the whole input once, running stages up to `through` and feeding
/// the numeric values of `columns` into running moments.
fn accumulate(
    input: &Path,
    chunk_options: ChunkOptions,
    config: &RuleConfig,
    policy: ErrorPolicy,
    global: &GlobalStatistics,
    through: Through,
    columns: &[String],
) -> Result<ColumnStats> {
    let span = info_span!("statistics_pass", ?through);
    let _guard = span.enter();

    let mut stats = ColumnStats::new();
    for chunk in ChunkReader::open(input, chunk_options)? {
        let frame = run_stages(&chunk?, config, policy, Some(global), through)?;
        for column in columns {
            let Ok(series) = frame.column(column) else {
                continue;
            };
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }
            let mut chunk_stats = RunningStats::new();
            for value in column_cells(&frame, column)
                .unwrap_or_default()
                .iter()
                .filter_map(CellValue::as_number)
            {
                chunk_stats.push(value);
            }
            stats.entry(column.clone()).or_default().merge(&chunk_stats);
        }
    }
    Ok(stats)
}
