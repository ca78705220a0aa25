//! Cleaning rule configuration.
//!
//! A [`RuleConfig`] is loaded once per run and passed by reference into every
//! cleaning stage. [`load_or_create`] writes the built-in SINASC rule set to
//! disk the first time it is asked for a missing file, so every run works from
//! an inspectable file.

pub mod column_list;
pub mod error;
pub mod loader;
pub mod rules;

pub use column_list::read_column_list;
pub use error::{ConfigError, Result};
pub use loader::{DEFAULT_CONFIG_PATH, load, load_or_create, save};
pub use rules::{DEFAULT_CHUNK_SIZE, DEFAULT_ZSCORE_LIMIT, RuleConfig, StatisticsScope};
