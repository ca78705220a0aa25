//! CLI argument definitions for the `sinasc` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sinasc_config::{DEFAULT_CONFIG_PATH, StatisticsScope};
use sinasc_stats::{DEFAULT_GEO_COLUMN, GeoMapping};

#[derive(Parser)]
#[command(
    name = "sinasc",
    version,
    about = "Clean and tabulate SINASC live-birth records",
    long_about = "Clean and tabulate SINASC live-birth records.\n\n\
                  `clean` streams a raw `;`-delimited extract through the rule file \
                  and writes a cleaned table; the other commands aggregate a cleaned \
                  table by state, region or category."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the default rule file.
    InitConfig(InitConfigArgs),

    /// Clean a raw extract into a `;`-delimited table.
    Clean(CleanArgs),

    /// Relative frequency of one column in fixed-width intervals.
    Frequency(FrequencyArgs),

    /// Count, mean, std, min, quartiles and max of numeric columns.
    Describe(DescribeArgs),

    /// Sum, count and mean of one column per state or region.
    Summary(SummaryArgs),

    /// Column means per race/colour category.
    Means(MeansArgs),
}

#[derive(Parser)]
pub struct InitConfigArgs {
    /// Rule file to write.
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Overwrite an existing rule file with the defaults.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Raw extract (`;`-delimited, UTF-8 or Latin-1).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Cleaned table to write; replaced if it exists.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Rule file; created with the defaults when absent.
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Rows per chunk (overrides the rule file).
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Where mean-fill and z-score statistics come from (overrides the rule file).
    #[arg(long = "scope", value_enum)]
    pub scope: Option<ScopeArg>,

    /// Fail on configured columns missing from the input instead of skipping the step.
    #[arg(long = "strict")]
    pub strict: bool,

    /// File with one additional column to remove per line.
    #[arg(long = "remove-list", value_name = "FILE")]
    pub remove_list: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FrequencyArgs {
    /// Cleaned table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Column to tabulate.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Interval width.
    #[arg(long = "width", value_name = "N", default_value_t = 1)]
    pub width: u32,

    /// Tabulate per state using this geography column.
    #[arg(long = "by-state", value_name = "GEO", num_args = 0..=1, default_missing_value = DEFAULT_GEO_COLUMN)]
    pub by_state: Option<String>,

    /// Write the table(s) as `;`-delimited CSV.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// Cleaned table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Columns to describe (comma-separated).
    #[arg(long = "columns", value_name = "A,B", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Describe per state using this geography column.
    #[arg(long = "by-state", value_name = "GEO", num_args = 0..=1, default_missing_value = DEFAULT_GEO_COLUMN)]
    pub by_state: Option<String>,

    /// Write one `describe_<group>.csv` per group into this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct SummaryArgs {
    /// Cleaned table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Column to sum.
    #[arg(long = "column", value_name = "COLUMN")]
    pub column: String,

    /// Geography column.
    #[arg(long = "geo", value_name = "GEO", default_value = DEFAULT_GEO_COLUMN)]
    pub geo: String,

    /// Group by state or by region.
    #[arg(long = "mapping", value_enum, default_value = "state")]
    pub mapping: MappingArg,

    /// Write the summary as `;`-delimited CSV.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct MeansArgs {
    /// Cleaned table.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Race/colour column holding codes 1-5.
    #[arg(long = "category", value_name = "COLUMN", default_value = "RACACORMAE")]
    pub category: String,

    /// Columns to average (comma-separated).
    #[arg(long = "columns", value_name = "A,B", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Average per state using this geography column.
    #[arg(long = "by-state", value_name = "GEO", num_args = 0..=1, default_missing_value = DEFAULT_GEO_COLUMN)]
    pub by_state: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI statistics scope choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    PerChunk,
    Global,
}

impl From<ScopeArg> for StatisticsScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::PerChunk => StatisticsScope::PerChunk,
            ScopeArg::Global => StatisticsScope::Global,
        }
    }
}

/// CLI geography mapping choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MappingArg {
    State,
    Region,
}

impl From<MappingArg> for GeoMapping {
    fn from(mapping: MappingArg) -> Self {
        match mapping {
            MappingArg::State => GeoMapping::State,
            MappingArg::Region => GeoMapping::Region,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
