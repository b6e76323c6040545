//! Configuration loader
//!
//! Path resolution order:
//! 1. Explicit path (`--config`)
//! 2. `ANALYST_CONFIG` environment variable
//! 3. `config/analyst.yaml` relative to the working directory
//! 4. Built-in defaults
//!
//! Environment overrides are applied on top of whatever was loaded.

use std::path::{Path, PathBuf};

use tracing::info;

use super::AnalystConfig;
use crate::error::ConfigError;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "config/analyst.yaml";

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Create loader from ANALYST_CONFIG env var or the default location
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var("ANALYST_CONFIG") {
            return Self::new(Some(PathBuf::from(path)));
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::new(Some(PathBuf::from(DEFAULT_CONFIG_PATH)));
        }
        Self::new(None)
    }

    /// Explicit path if given, otherwise the environment lookup
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        match explicit {
            Some(path) => Self::new(Some(path)),
            None => Self::from_env(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load, apply environment overrides, validate
    pub fn load(&self) -> Result<AnalystConfig, ConfigError> {
        let mut config = match &self.path {
            Some(path) => Self::load_file(path)?,
            None => {
                info!("No config file found, using defaults");
                AnalystConfig::default()
            }
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<AnalystConfig, ConfigError> {
        info!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(AnalystConfig::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Apply environment overrides through a lookup function
pub fn apply_overrides<F>(config: &mut AnalystConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(backend) = lookup("ANALYST_BACKEND") {
        config.model.backend = backend.parse()?;
    }
    if let Some(model_id) = lookup("ANALYST_MODEL_ID") {
        config.model.model_id = Some(model_id);
    }
    if let Some(interpreter) = lookup("ANALYST_PYTHON") {
        config.executor.interpreter = interpreter;
    }
    if let Some(dir) = lookup("ANALYST_RESOURCES_DIR") {
        config.resources.dir = PathBuf::from(dir);
    }
    Ok(())
}
