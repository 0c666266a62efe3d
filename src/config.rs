use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{LegacyError, Result};
use crate::resolver::OverrideTable;

/// Which modules get an import line in the generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportPolicy {
    /// Only modules referenced by at least one alias
    #[default]
    UsedOnly,
    /// Every module found in the corpus
    AllModules,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub types_file: PathBuf,
    pub enums_file: PathBuf,
    pub corpus_root: PathBuf,
    pub module_prefix: String,
    pub source_suffix: String,
    pub import_base: String,
    pub package_name: String,
    pub container: String,
    pub import_policy: ImportPolicy,
    /// Drop the built-in rename table instead of extending it
    pub replace_overrides: bool,
    pub overrides: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            types_file: PathBuf::from(constants::DEFAULT_TYPES_FILE),
            enums_file: PathBuf::from(constants::DEFAULT_ENUMS_FILE),
            corpus_root: PathBuf::from(constants::DEFAULT_CORPUS_ROOT),
            module_prefix: constants::MODULE_PREFIX.to_string(),
            source_suffix: constants::SOURCE_SUFFIX.to_string(),
            import_base: constants::IMPORT_BASE.to_string(),
            package_name: constants::PACKAGE_NAME.to_string(),
            container: constants::CONTAINER_NAME.to_string(),
            import_policy: ImportPolicy::default(),
            replace_overrides: false,
            overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load settings from `path`, or from `proto-legacy.toml` in the working
    /// directory when no path is given. Only an explicitly requested file has
    /// to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(constants::DEFAULT_CONFIG_FILE), false),
        };

        if !required && !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            LegacyError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::from_toml(&config_content)?;
        debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.module_prefix.is_empty() {
            return Err(LegacyError::Config("module_prefix must not be empty".to_string()));
        }
        if self.source_suffix.is_empty() {
            return Err(LegacyError::Config("source_suffix must not be empty".to_string()));
        }
        if self.container.is_empty() {
            return Err(LegacyError::Config("container must not be empty".to_string()));
        }
        Ok(())
    }

    /// Built-in renames merged with the entries from the config file.
    /// File entries win on conflict.
    pub fn override_table(&self) -> OverrideTable {
        let mut table = if self.replace_overrides {
            OverrideTable::empty()
        } else {
            OverrideTable::builtin()
        };
        for (legacy, declared) in &self.overrides {
            table.insert(legacy.clone(), declared.clone());
        }
        table
    }
}
