//! Common error types for oggplay

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for oggplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across oggplay crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read
    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema
    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
