//! The rule set driving one cleaning run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sinasc_common::ScalarValue;

/// Rows per chunk used by the original batch scripts.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Absolute z-score at or above which a row is rejected.
pub const DEFAULT_ZSCORE_LIMIT: f64 = 4.0;

/// Where mean-imputation and z-score moments come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticsScope {
    /// Each chunk uses its own mean and standard deviation. Results depend
    /// on the chunk size.
    PerChunk,
    /// Moments are accumulated over the whole file in preparatory passes.
    #[default]
    Global,
}

/// Declarative cleaning rules.
///
/// Fields absent from a rule file take neutral values (no columns, limit 4,
/// global scope), so a partial file means exactly what it says.
/// [`RuleConfig::default`] is the full SINASC rule set written by
/// [`crate::load_or_create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Column promoted to the row identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_column: Option<String>,

    #[serde(default)]
    pub columns_to_remove: BTreeSet<String>,

    /// Rows with a missing value in any of these columns are discarded.
    #[serde(default)]
    pub columns_to_dropna: Vec<String>,

    /// Missing values replaced by the column mean.
    #[serde(default)]
    pub columns_to_fill_mean: Vec<String>,

    #[serde(default)]
    pub columns_to_filter_by_zscore: Vec<String>,

    #[serde(default = "default_zscore_limit")]
    pub zscore_limit: f64,

    #[serde(default)]
    pub statistics_scope: StatisticsScope,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Categorical whitelist per column.
    #[serde(default)]
    pub restrictions: BTreeMap<String, Vec<ScalarValue>>,

    /// Missing values replaced by a fixed constant.
    #[serde(default)]
    pub columns_to_fill_values: BTreeMap<String, ScalarValue>,
}

fn default_zscore_limit() -> f64 {
    DEFAULT_ZSCORE_LIMIT
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

const REMOVED_COLUMNS: &[&str] = &[
    "CODMUNNASC",
    "CODOCUPMAE",
    "CODMUNRES",
    "DTNASC",
    "APGAR1",
    "APGAR5",
    "PESO",
    "CODANOMAL",
    "HORANASC",
    "IDANOMAL",
    "CODESTAB",
    "DTCADASTRO",
    "DTRECEBIM",
    "ORIGEM",
    "CODCART",
    "NUMREGCART",
    "DTREGCART",
    "CODPAISRES",
    "NUMEROLOTE",
    "VERSAOSIST",
    "DIFDATA",
    "DTRECORIG",
    "NATURALMAE",
    "CODMUNNATU",
    "DTNASCMAE",
    "IDADEPAI",
    "DTULTMENST",
    "TPMETESTIM",
    "TPAPRESENT",
    "TPROBSON",
    "STDNEPIDEM",
    "STDNNOVA",
    "CODMUNCART",
    "CODUFNATU",
    "TPNASCASSI",
    "DTRECORIGA",
    "TPFUNCRESP",
    "TPDOCRESP",
    "DTDECLARAC",
    "SERIESCMAE",
];

const RESTRICTIONS: &[(&str, &[i64])] = &[
    ("LOCNASC", &[1, 2, 3, 4, 5]),
    ("ESTCIVMAE", &[1, 2, 3, 4, 5, 9]),
    ("ESCMAE", &[1, 2, 3, 4, 5, 9]),
    ("GESTACAO", &[1, 2, 3, 4, 5, 6, 9]),
    ("GRAVIDEZ", &[1, 2, 3, 9]),
    ("PARTO", &[1, 2, 3, 4, 5, 9]),
    ("CONSULTAS", &[1, 2, 3, 4, 9]),
    ("SEXO", &[0, 1, 2]),
    ("RACACOR", &[1, 2, 3, 4, 5]),
    ("RACACORMAE", &[1, 2, 3, 4, 5]),
    ("STTRABPART", &[1, 2, 3, 9]),
    ("STCESPARTO", &[1, 2, 3, 9]),
    ("ESCMAE2010", &[0, 1, 2, 3, 4, 5, 9]),
];

const DROPNA_COLUMNS: &[&str] = &["LOCNASC", "RACACOR", "SEXO", "RACACORMAE", "MESPRENAT"];

const FILL_MEAN_COLUMNS: &[&str] = &["SEMAGESTAC"];

const FILL_ZERO_COLUMNS: &[&str] = &[
    "QTDFILVIVO",
    "QTDFILMORT",
    "QTDGESTANT",
    "QTDPARTNOR",
    "QTDPARTCES",
];

const ZSCORE_COLUMNS: &[&str] = &[
    "IDADEMAE",
    "CONSULTAS",
    "QTDGESTANT",
    "QTDPARTNOR",
    "QTDPARTCES",
    "SEMAGESTAC",
    "CONSPRENAT",
    "MESPRENAT",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            index_column: Some("CONTADOR".to_string()),
            columns_to_remove: REMOVED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            columns_to_dropna: owned(DROPNA_COLUMNS),
            columns_to_fill_mean: owned(FILL_MEAN_COLUMNS),
            columns_to_filter_by_zscore: owned(ZSCORE_COLUMNS),
            zscore_limit: DEFAULT_ZSCORE_LIMIT,
            statistics_scope: StatisticsScope::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            restrictions: RESTRICTIONS
                .iter()
                .map(|(column, allowed)| {
                    let values = allowed.iter().map(|v| ScalarValue::Int(*v)).collect();
                    ((*column).to_string(), values)
                })
                .collect(),
            columns_to_fill_values: FILL_ZERO_COLUMNS
                .iter()
                .map(|column| ((*column).to_string(), ScalarValue::Int(0)))
                .collect(),
        }
    }
}

impl RuleConfig {
    /// A rule set that changes nothing: no index, no removals, no filters.
    pub fn empty() -> Self {
        Self {
            index_column: None,
            columns_to_remove: BTreeSet::new(),
            columns_to_dropna: Vec::new(),
            columns_to_fill_mean: Vec::new(),
            columns_to_filter_by_zscore: Vec::new(),
            zscore_limit: DEFAULT_ZSCORE_LIMIT,
            statistics_scope: StatisticsScope::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            restrictions: BTreeMap::new(),
            columns_to_fill_values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_columns_to_remove<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_remove = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Merge extra removals (e.g. from a column list file) into the set.
    #[must_use]
    pub fn with_additional_removals<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_remove
            .extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_restriction<I>(mut self, column: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = ScalarValue>,
    {
        self.restrictions
            .insert(column.into(), allowed.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_columns_to_dropna<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_dropna = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_columns_to_fill_mean<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_fill_mean = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_fill_value(mut self, column: impl Into<String>, value: ScalarValue) -> Self {
        self.columns_to_fill_values.insert(column.into(), value);
        self
    }

    #[must_use]
    pub fn with_zscore_filter<I, S>(mut self, columns: I, limit: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_filter_by_zscore = columns.into_iter().map(Into::into).collect();
        self.zscore_limit = limit;
        self
    }

    #[must_use]
    pub fn with_statistics_scope(mut self, scope: StatisticsScope) -> Self {
        self.statistics_scope = scope;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Problems that make the rule set unusable, as human-readable messages.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.chunk_size == 0 {
            problems.push("chunk_size must be greater than zero".to_string());
        }
        if !self.zscore_limit.is_finite() || self.zscore_limit <= 0.0 {
            problems.push(format!(
                "zscore_limit must be a positive number, got {}",
                self.zscore_limit
            ));
        }
        if let Some(index) = &self.index_column
            && self.columns_to_remove.contains(index)
        {
            problems.push(format!(
                "index column {index} is also listed in columns_to_remove"
            ));
        }
        problems
    }
}
