//! Configuration management for the health checker

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

mod provider;

pub use provider::TomlConfigProvider;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = ".pchc.toml";

/// Configuration provider trait
pub trait ConfigProvider {
    /// Load configuration for inputs under the given directory
    fn load_config(&self, base_dir: &Path) -> Result<HealthConfig, ConfigError>;
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Exit non-zero when the global score is below this value
    pub fail_under: Option<u8>,

    /// Walk directory inputs recursively
    pub recursive: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            fail_under: None,
            recursive: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decorate output with emoji
    pub use_emoji: bool,

    /// Print the raw evidence excerpt under each issue
    pub show_raw: bool,

    /// Print the suggested fix under each issue
    pub show_remediation: bool,

    /// Max issues to list, unbounded when absent
    pub max_issues: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_emoji: true,
            show_raw: false,
            show_remediation: true,
            max_issues: None,
        }
    }
}

/// Parser selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsersConfig {
    /// Parser names removed from the registry
    pub disabled: Vec<String>,
}

/// File intake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Glob patterns a file found while walking a directory must match
    pub include: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            include: ["*.html", "*.htm", "*.txt", "*.csv", "*.xml", "*.json", "*.log"]
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
        }
    }
}

impl InputConfig {
    /// Compile the include patterns, matched case-insensitively
    pub fn include_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.include {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(false)
                .build()
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: self.include.join(", "),
            message: e.to_string(),
        })
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// General configuration
    #[serde(default)]
    pub general: GeneralConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Parser configuration
    #[serde(default)]
    pub parsers: ParsersConfig,

    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
}

impl HealthConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
