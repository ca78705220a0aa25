//! Command-line driver for the SINASC cleaning and aggregation crates.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
