//! Reading and writing rule files.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::rules::RuleConfig;

/// File name used when no rule file is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "sinasc-rules.toml";

/// Load and validate a rule file.
pub fn load(path: &Path) -> Result<RuleConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let config: RuleConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let problems = config.problems();
    if !problems.is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: problems.join("; "),
        });
    }

    debug!(
        path = %path.display(),
        restrictions = config.restrictions.len(),
        removals = config.columns_to_remove.len(),
        "loaded rule file"
    );
    Ok(config)
}

/// Write `config` as pretty TOML, creating parent directories as needed.
pub fn save(config: &RuleConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))
}

/// Load the rule file at `path`, writing the built-in SINASC rules there
/// first when it does not exist.
pub fn load_or_create(path: &Path) -> Result<RuleConfig> {
    if !path.exists() {
        info!(path = %path.display(), "rule file not found, writing default rules");
        save(&RuleConfig::default(), path)?;
    }
    load(path)
}
