use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{ConfigProvider, HealthConfig, CONFIG_FILE_NAME};
use crate::errors::ConfigError;

/// TOML-based configuration provider
#[derive(Debug, Default)]
pub struct TomlConfigProvider {
    /// File given on the command line, skipping discovery
    config_path: Option<PathBuf>,
}

impl TomlConfigProvider {
    /// Create a new TOML configuration provider
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Load this file instead of searching for one
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Find the project config by walking from `base_dir` up through its parents
    fn find_project_config(&self, base_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = Some(base_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            current_dir = dir.parent();
        }

        None
    }

    /// Read configuration from a file
    fn read_config_file(&self, path: &Path) -> Result<HealthConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::LoadError {
                path: path.to_path_buf(),
                message: "File does not exist".to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn load_config(&self, base_dir: &Path) -> Result<HealthConfig, ConfigError> {
        if let Some(path) = &self.config_path {
            debug!("Loading config from {:?}", path);
            return self.read_config_file(path);
        }

        match self.find_project_config(base_dir) {
            Some(path) => {
                debug!("Loading project config from {:?}", path);
                self.read_config_file(&path)
            }
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(HealthConfig::default())
            }
        }
    }
}
