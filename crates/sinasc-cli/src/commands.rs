//! Subcommand implementations. Each returns its result for `summary` to print.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use sinasc_clean::{CleanOptions, CleanReport, ErrorPolicy, clean_with};
use sinasc_config::{RuleConfig, load, load_or_create, read_column_list, save};
use sinasc_ingest::{ChunkOptions, read_table};
use sinasc_stats::{
    CategoryMeans, FrequencyTable, GeoMapping, LocationSummary, RACE_CATEGORIES, SummaryStats,
    describe, describe_by_state, location_summary, mean_by_category, mean_by_state_and_category,
    relative_frequency, relative_frequency_by_state, separate_by_location_on,
    write_frequency_csv, write_location_summary_csv, write_summary_stats_csv,
};

use crate::cli::{
    CleanArgs, DescribeArgs, FrequencyArgs, InitConfigArgs, MeansArgs, SummaryArgs,
};

/// Group name used when results are not split by state.
pub const ALL_GROUP: &str = "Brasil";

#[derive(Debug)]
pub struct InitConfigResult {
    pub path: PathBuf,
    /// `false` when an existing file was kept.
    pub written: bool,
    pub config: RuleConfig,
}

#[derive(Debug)]
pub struct CleanResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config_path: PathBuf,
    pub report: CleanReport,
    pub elapsed: Duration,
}

pub fn run_init_config(args: &InitConfigArgs) -> Result<InitConfigResult> {
    let path = &args.config;
    if path.exists() && !args.force {
        let config = load(path).with_context(|| format!("read {}", path.display()))?;
        return Ok(InitConfigResult {
            path: path.clone(),
            written: false,
            config,
        });
    }
    let config = RuleConfig::default();
    save(&config, path).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote default rules");
    Ok(InitConfigResult {
        path: path.clone(),
        written: true,
        config,
    })
}

/// Rule file plus command-line overrides.
fn effective_rules(args: &CleanArgs) -> Result<RuleConfig> {
    let mut config = load_or_create(&args.config)
        .with_context(|| format!("load rules from {}", args.config.display()))?;
    if let Some(list) = &args.remove_list {
        let columns = read_column_list(list)
            .with_context(|| format!("read column list {}", list.display()))?;
        config = config.with_additional_removals(columns);
    }
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(scope) = args.scope {
        config = config.with_statistics_scope(scope.into());
    }
    Ok(config)
}

pub fn run_clean(args: &CleanArgs) -> Result<CleanResult> {
    let span = info_span!("clean_command", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = effective_rules(args)?;
    let policy = if args.strict {
        ErrorPolicy::Strict
    } else {
        ErrorPolicy::Permissive
    };
    let report = clean_with(
        &args.input,
        &args.output,
        &config,
        CleanOptions::default().with_policy(policy),
    )
    .with_context(|| format!("clean {}", args.input.display()))?;

    Ok(CleanResult {
        input: args.input.clone(),
        output: args.output.clone(),
        config_path: args.config.clone(),
        report,
        elapsed: start.elapsed(),
    })
}

fn load_cleaned(path: &Path) -> Result<DataFrame> {
    read_table(path, ChunkOptions::default()).with_context(|| format!("read {}", path.display()))
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn run_frequency(args: &FrequencyArgs) -> Result<Vec<(String, FrequencyTable)>> {
    let df = load_cleaned(&args.input)?;
    let tables = match &args.by_state {
        Some(geo) => relative_frequency_by_state(&df, geo, &args.column, args.width)
            .with_context(|| format!("frequency of {} by {geo}", args.column))?,
        None => vec![(
            ALL_GROUP.to_string(),
            relative_frequency(&df, &args.column, args.width)
                .with_context(|| format!("frequency of {}", args.column))?,
        )],
    };
    if let Some(path) = &args.output {
        let mut writer = create_output(path)?;
        write_frequency_csv(&mut writer, &tables)
            .with_context(|| format!("write {}", path.display()))?;
        writer.flush()?;
    }
    Ok(tables)
}

pub fn run_describe(args: &DescribeArgs) -> Result<Vec<(String, Vec<SummaryStats>)>> {
    let df = load_cleaned(&args.input)?;
    let groups = match &args.by_state {
        Some(geo) => describe_by_state(&df, geo, &args.columns)
            .with_context(|| format!("describe by {geo}"))?,
        None => vec![(
            ALL_GROUP.to_string(),
            describe(&df, &args.columns).context("describe")?,
        )],
    };
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        for (group, stats) in &groups {
            let path = dir.join(format!("describe_{group}.csv"));
            let mut writer = create_output(&path)?;
            write_summary_stats_csv(&mut writer, stats)
                .with_context(|| format!("write {}", path.display()))?;
            writer.flush()?;
        }
    }
    Ok(groups)
}

pub fn run_summary(args: &SummaryArgs) -> Result<Vec<LocationSummary>> {
    let df = load_cleaned(&args.input)?;
    let mapping = GeoMapping::from(args.mapping);
    let partitions = separate_by_location_on(&df, &args.geo, mapping)
        .with_context(|| format!("partition by {mapping}"))?;
    let summary = location_summary(&partitions, &args.column)
        .with_context(|| format!("summarise {}", args.column))?;
    if let Some(path) = &args.output {
        let mut writer = create_output(path)?;
        write_location_summary_csv(&mut writer, &summary)
            .with_context(|| format!("write {}", path.display()))?;
        writer.flush()?;
    }
    Ok(summary)
}

pub fn run_means(args: &MeansArgs) -> Result<Vec<(String, Vec<CategoryMeans>)>> {
    if args.columns.is_empty() {
        bail!("--columns needs at least one column");
    }
    let df = load_cleaned(&args.input)?;
    match &args.by_state {
        Some(geo) => mean_by_state_and_category(
            &df,
            geo,
            &args.category,
            &args.columns,
            &RACE_CATEGORIES,
        )
        .with_context(|| format!("means by {geo} and {}", args.category)),
        None => Ok(vec![(
            ALL_GROUP.to_string(),
            mean_by_category(&df, &args.category, &args.columns, &RACE_CATEGORIES)
                .with_context(|| format!("means by {}", args.category))?,
        )]),
    }
}
