//! Configuration file resolution and loading
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`<config_dir>/<app>/config.toml`)
//! 4. System config file (`/etc/<app>/config.toml`, Linux only)
//! 5. None: built-in defaults
//!
//! A missing file at a default location is never fatal. A file that was
//! explicitly requested (CLI or environment) must exist and parse.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Where a resolved config file path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserDirectory,
    System,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves and loads the TOML config file for one application
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    app_name: String,
    env_var_name: String,
}

impl ConfigResolver {
    /// Create a resolver for `app_name`; the environment variable defaults to
    /// `<APP_NAME>_CONFIG` (upper-cased, dashes replaced by underscores).
    pub fn new(app_name: &str) -> Self {
        let env_var_name = format!("{}_CONFIG", app_name.to_uppercase().replace('-', "_"));
        Self {
            app_name: app_name.to_string(),
            env_var_name,
        }
    }

    /// Override the environment variable consulted at priority 2
    pub fn with_env_var(mut self, env_var_name: &str) -> Self {
        self.env_var_name = env_var_name.to_string();
        self
    }

    pub fn env_var_name(&self) -> &str {
        &self.env_var_name
    }

    /// Find the config file to use, if any
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<(PathBuf, ConfigSource)> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some((path.to_path_buf(), ConfigSource::CommandLine));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                return Some((PathBuf::from(path), ConfigSource::Environment));
            }
        }

        // Priority 3: User config directory
        if let Some(path) = dirs::config_dir().map(|d| d.join(&self.app_name).join(CONFIG_FILE_NAME)) {
            if path.exists() {
                return Some((path, ConfigSource::UserDirectory));
            }
        }

        // Priority 4: System config file
        if cfg!(target_os = "linux") {
            let path = PathBuf::from("/etc").join(&self.app_name).join(CONFIG_FILE_NAME);
            if path.exists() {
                return Some((path, ConfigSource::System));
            }
        }

        None
    }

    /// Resolve and load the config, falling back to `T::default()` when no
    /// file is found at any location.
    pub fn load_or_default<T>(&self, cli_arg: Option<&Path>) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.resolve(cli_arg) {
            Some((path, source)) => {
                debug!("Using config file {} ({:?})", path.display(), source);
                let config = load_toml(&path)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => {
                warn!(
                    "No config file found for {} (set {} or pass --config), using built-in defaults",
                    self.app_name, self.env_var_name
                );
                Ok(T::default())
            }
        }
    }
}

/// Read and parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
