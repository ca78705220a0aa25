//! IBGE geographic code tables and prefix partitioning.
//!
//! Municipality codes are 6-7 digits. The first two digits are the state
//! code and the first digit is the region code, so a single code column can
//! be grouped at either level by comparing string prefixes.

use std::fmt;
use std::str::FromStr;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use serde::Serialize;
use sinasc_common::{any_is_null, any_to_string};

use crate::error::{Result, StatsError};

/// One row of a geographic code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeoEntry {
    /// IBGE code as text (`"12"` for Acre, `"1"` for Norte).
    pub code: &'static str,
    /// Short label (`"AC"`); regions use their name.
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn entry(code: &'static str, abbreviation: &'static str, name: &'static str) -> GeoEntry {
    GeoEntry {
        code,
        abbreviation,
        name,
    }
}

/// The 27 federative units in table order.
pub static STATES: [GeoEntry; 27] = [
    entry("12", "AC", "Acre"),
    entry("27", "AL", "Alagoas"),
    entry("16", "AP", "Amapá"),
    entry("13", "AM", "Amazonas"),
    entry("29", "BA", "Bahia"),
    entry("23", "CE", "Ceará"),
    entry("53", "DF", "Distrito Federal"),
    entry("32", "ES", "Espírito Santo"),
    entry("52", "GO", "Goiás"),
    entry("21", "MA", "Maranhão"),
    entry("51", "MT", "Mato Grosso"),
    entry("50", "MS", "Mato Grosso do Sul"),
    entry("31", "MG", "Minas Gerais"),
    entry("15", "PA", "Pará"),
    entry("25", "PB", "Paraíba"),
    entry("41", "PR", "Paraná"),
    entry("26", "PE", "Pernambuco"),
    entry("22", "PI", "Piauí"),
    entry("24", "RN", "Rio Grande do Norte"),
    entry("43", "RS", "Rio Grande do Sul"),
    entry("33", "RJ", "Rio de Janeiro"),
    entry("11", "RO", "Rondônia"),
    entry("14", "RR", "Roraima"),
    entry("42", "SC", "Santa Catarina"),
    entry("35", "SP", "São Paulo"),
    entry("28", "SE", "Sergipe"),
    entry("17", "TO", "Tocantins"),
];

/// The 5 macro-regions in table order.
pub static REGIONS: [GeoEntry; 5] = [
    entry("1", "Norte", "Norte"),
    entry("2", "Nordeste", "Nordeste"),
    entry("3", "Sudeste", "Sudeste"),
    entry("4", "Sul", "Sul"),
    entry("5", "Centro-Oeste", "Centro-Oeste"),
];

/// Which code table to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoMapping {
    State,
    Region,
}

impl GeoMapping {
    pub fn entries(self) -> &'static [GeoEntry] {
        match self {
            Self::State => &STATES,
            Self::Region => &REGIONS,
        }
    }

    /// Number of leading code digits that identify an entry.
    pub fn prefix_len(self) -> usize {
        match self {
            Self::State => 2,
            Self::Region => 1,
        }
    }
}

impl FromStr for GeoMapping {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" | "states" | "uf" => Ok(Self::State),
            "region" | "regions" => Ok(Self::Region),
            _ => Err(StatsError::InvalidMapping {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for GeoMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::State => "state",
            Self::Region => "region",
        })
    }
}

/// Stringified geographic codes of `column`, missing cells as `None`.
pub fn geo_codes(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(column)
        .map_err(|_| StatsError::column_not_found(column))?;
    let mut codes = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = series.get(idx)?;
        codes.push(if any_is_null(&value) {
            None
        } else {
            Some(any_to_string(value).trim().to_string())
        });
    }
    Ok(codes)
}

/// Rows of `df` whose code starts with `prefix`.
pub fn filter_by_prefix(df: &DataFrame, codes: &[Option<String>], prefix: &str) -> Result<DataFrame> {
    let keep: Vec<bool> = codes
        .iter()
        .map(|code| code.as_deref().is_some_and(|code| code.starts_with(prefix)))
        .collect();
    let mask = BooleanChunked::from_slice("prefix".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Split `df` by code prefix, one frame per entry of `mapping` in table
/// order, empty frames included.
pub fn partition_by_prefix(
    df: &DataFrame,
    geo_column: &str,
    mapping: GeoMapping,
) -> Result<Vec<(&'static GeoEntry, DataFrame)>> {
    let codes = geo_codes(df, geo_column)?;
    mapping
        .entries()
        .iter()
        .map(|entry| Ok((entry, filter_by_prefix(df, &codes, entry.code)?)))
        .collect()
}
