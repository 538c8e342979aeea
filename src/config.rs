//! fdnorm configuration
//!
//! Handles loading of `fdnorm.yaml`, either from an explicit path or from the
//! working directory. Every field has a default, so an absent file and an
//! empty file behave the same.
//!
//! ```yaml
//! version: 1
//! normalize:
//!   normal_form: 2
//!   implicit_key_dependency: true
//!   naming:
//!     split_entity: "{entity}_{determinants}"
//!     separator: "_"
//! output: yaml
//! ```

use crate::error::{Error, Result};
use crate::normalize::NormalForm;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "fdnorm.yaml";

/// Root configuration (`fdnorm.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Normalization settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Output format of the `normalize` command
    #[serde(default)]
    pub output: OutputFormat,
}

/// Normalization settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeConfig {
    /// Target normal form (2 or 3)
    #[serde(default = "default_normal_form")]
    #[schemars(with = "u8")]
    pub normal_form: NormalForm,

    /// Treat the primary key as determining every other attribute
    #[serde(default = "default_true")]
    pub implicit_key_dependency: bool,

    /// Naming of entities created by a split
    #[serde(default)]
    pub naming: NamingConfig,
}

/// Naming convention for split-off entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NamingConfig {
    /// Entity pattern: {entity}, {determinants}
    #[serde(default = "default_split_entity")]
    pub split_entity: String,

    /// Joins determinant names inside {determinants}
    #[serde(default = "default_separator")]
    pub separator: String,
}

/// Serialization format for schemes written by the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

fn default_version() -> u32 {
    1
}

fn default_normal_form() -> NormalForm {
    NormalForm::Second
}

fn default_true() -> bool {
    true
}

fn default_split_entity() -> String {
    "{entity}_{determinants}".to_string()
}

fn default_separator() -> String {
    "_".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            normalize: NormalizeConfig::default(),
            output: OutputFormat::default(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            normal_form: default_normal_form(),
            implicit_key_dependency: true,
            naming: NamingConfig::default(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            split_entity: default_split_entity(),
            separator: default_separator(),
        }
    }
}

impl NamingConfig {
    /// Apply the naming pattern to a split-off entity
    pub fn entity_name(&self, entity: &str, determinants: &BTreeSet<String>) -> String {
        let determinants = determinants
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&self.separator);

        self.split_entity
            .replace("{entity}", entity)
            .replace("{determinants}", &determinants)
    }
}

impl Config {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Parse configuration from YAML, rejecting unknown versions
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_norway::from_str(yaml)?
        };

        if config.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported config version: {}",
                config.version
            )));
        }

        Ok(config)
    }

    /// Load `fdnorm.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }
        Self::load(&config_file).map(Some)
    }

    /// Explicit path if given, otherwise the working directory, otherwise defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let current_dir = std::env::current_dir().map_err(Error::Io)?;
        Ok(Self::load_from_dir(&current_dir)?.unwrap_or_default())
    }
}
