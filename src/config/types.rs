//! Configuration types.
//!
//! This module defines the logging enums shared with the CLI and the library
//! `Config` struct, which can be constructed programmatically without any CLI
//! dependencies.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    BATCH_SIZE, DB_PATH, DOWNLOAD_TIMEOUT, GEONAMES_BASE_URL, STAGING_DIR,
};
use crate::config::policy::Policy;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Constructed once (by the CLI or by a caller embedding the library) and passed
/// by reference into every component. Nothing in the crate reads ambient
/// global state.
///
/// # Examples
///
/// ```no_run
/// use geonames_sync::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("world.db"),
///     batch_size: 5000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Directory where downloaded and extracted source files are staged
    pub directory: PathBuf,

    /// Base URL the GeoNames resources are resolved against
    pub base_url: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Rows buffered per table before a batch write
    pub batch_size: usize,

    /// Timeout for one download attempt
    pub download_timeout: Duration,

    /// Which entity kinds are stored and how rows are filtered
    pub policy: Policy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            directory: PathBuf::from(STAGING_DIR),
            base_url: GEONAMES_BASE_URL.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            batch_size: BATCH_SIZE,
            download_timeout: DOWNLOAD_TIMEOUT,
            policy: Policy::default(),
        }
    }
}
