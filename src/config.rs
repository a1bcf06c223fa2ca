//! Settings read from `ecfformat.toml`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid date format '{0}'")]
    DateFormat(String),
}

/// Validation settings
///
/// Every key is optional, missing ones take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// report suspicious values (dates, codes, scores) as warnings
    pub check_values: bool,
    /// unknown field names longer than this mean the file is not a submission
    pub max_name_length: usize,
    /// same for the values of unknown fields
    pub max_value_length: usize,
    /// `chrono` format of date values
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_values: true,
            max_name_length: 40,
            max_value_length: 100,
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl Config {
    /// File read when no path is given
    pub const DEFAULT_PATH: &'static str = "ecfformat.toml";

    /// Read the configuration at `path`, or at `DEFAULT_PATH` if there is
    /// no `path`
    ///
    /// An explicit `path` must exist. A missing default file gives the
    /// default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(Self::DEFAULT_PATH), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError(path.clone(), e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// A format is rejected if it cannot print a date
    fn check(&self) -> Result<(), ConfigError> {
        use chrono::format::{Item, StrftimeItems};
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::DateFormat(self.date_format.clone()));
        }
        Ok(())
    }
}
