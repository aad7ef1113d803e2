//! # oggplay Common Library
//!
//! Shared code for the oggplay crates:
//! - Error type for configuration and I/O
//! - Configuration file resolution and TOML loading
//! - Logging configuration

pub mod config;
pub mod error;

pub use config::{ConfigResolver, LoggingConfig};
pub use error::{Error, Result};
