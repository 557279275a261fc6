//! Conversion settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use varitoken_ingest_csv::{IngestOptions, DEFAULT_MODE};

use crate::value::types;

/// Settings for one conversion run.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Mode for rows without one
    pub default_mode: String,
    /// `$type` for tokens whose row has no type
    pub default_type: String,
    /// Kebab-case each name segment (`Beaver Orange` → `beaver-orange`)
    pub kebab_names: bool,
    /// Fail the run on any diagnostic instead of converting best-effort
    pub strict: bool,
    /// Directory the per-mode documents are written to
    pub out_dir: PathBuf,
    /// Appended to each mode's slug to form its file name
    pub file_suffix: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            default_mode: DEFAULT_MODE.to_string(),
            default_type: types::STRING.to_string(),
            kebab_names: false,
            strict: false,
            out_dir: PathBuf::from("tokens"),
            file_suffix: ".tokens.json".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConvertConfig {
    /// Parse a JSON config; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_mode.trim().is_empty() {
            return Err(ConfigError::Invalid("default_mode must not be empty".to_string()));
        }
        if self.default_type.trim().is_empty() {
            return Err(ConfigError::Invalid("default_type must not be empty".to_string()));
        }
        if !self.file_suffix.ends_with(".json") {
            return Err(ConfigError::Invalid(format!(
                "file_suffix `{}` must end in `.json`",
                self.file_suffix
            )));
        }
        if self.file_suffix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "file_suffix `{}` must not contain path separators",
                self.file_suffix
            )));
        }
        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            default_mode: self.default_mode.clone(),
        }
    }
}
