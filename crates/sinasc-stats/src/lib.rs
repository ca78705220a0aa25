//! Grouped aggregation of cleaned SINASC tables.
//!
//! All functions take the frame by reference and return new values; none
//! modifies its input. Errors are always returned, never logged and skipped.
//!
//! Two kinds of geographic grouping are provided:
//!
//! - **Prefix** grouping ([`relative_frequency_by_state`],
//!   [`describe_by_state`], [`mean_by_state_and_category`]) keeps rows whose
//!   stringified code starts with a state code, so 6-7 digit municipality
//!   codes fall under their state.
//! - **Exact** partitioning ([`separate_by_location`]) truncates the code to
//!   the mapping's prefix length and matches it exactly, returning every
//!   state or region including empty ones.

mod category_counts;
mod describe;
mod error;
mod export;
mod frequency;
mod geo;
mod location;
mod means;

// === Error Types ===
pub use error::{Result, StatsError};

// === Geography ===
pub use geo::{
    GeoEntry, GeoMapping, REGIONS, STATES, filter_by_prefix, geo_codes, partition_by_prefix,
};
pub use location::{
    DEFAULT_GEO_COLUMN, LocationSummary, Partition, location_summary, separate_by_location,
    separate_by_location_on,
};

// === Aggregation ===
pub use category_counts::{CategoryCounts, CategoryTotals, accumulate_category_totals};
pub use describe::{SummaryStats, describe, describe_by_state};
pub use frequency::{
    FrequencyBin, FrequencyTable, MAX_BINS, relative_frequency, relative_frequency_by_state,
};
pub use means::{
    Category, CategoryMeans, RACE_CATEGORIES, mean_by_category, mean_by_state_and_category,
};

// === Export ===
pub use export::{write_frequency_csv, write_location_summary_csv, write_summary_stats_csv};
