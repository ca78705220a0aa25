//! `sinasc` command-line driver.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use sinasc_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use sinasc_cli::commands::{
    run_clean, run_describe, run_frequency, run_init_config, run_means, run_summary,
};
use sinasc_cli::logging::{LogConfig, LogFormat, init_logging};
use sinasc_cli::summary::{
    print_clean, print_describe, print_frequency, print_init_config, print_location_summary,
    print_means,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::InitConfig(args) => run_init_config(args).map(|result| print_init_config(&result)),
        Command::Clean(args) => run_clean(args).map(|result| print_clean(&result)),
        Command::Frequency(args) => {
            run_frequency(args).and_then(|tables| print_frequency(&tables, args.json))
        }
        Command::Describe(args) => {
            run_describe(args).and_then(|groups| print_describe(&groups, args.json))
        }
        Command::Summary(args) => {
            run_summary(args).and_then(|rows| print_location_summary(&rows, args.json))
        }
        Command::Means(args) => run_means(args).and_then(|groups| print_means(&groups, args.json)),
    };
    if let Err(error) = outcome {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
