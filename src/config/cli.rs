//! Command-line options.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::constants::{BATCH_SIZE, DB_PATH, GEONAMES_BASE_URL, STAGING_DIR};
use crate::config::policy::Policy;
use crate::config::types::{Config, LogFormat, LogLevel};
use crate::error_handling::SupplyError;

/// Loads GeoNames into SQLite and keeps it in sync with the daily feeds.
#[derive(Debug, Parser)]
#[command(name = "geonames_sync", version, about)]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file
    #[arg(long, global = true, env = "GEONAMES_DB_PATH", default_value = DB_PATH)]
    pub db: PathBuf,

    /// Staging directory for downloaded files
    #[arg(long, global = true, env = "GEONAMES_DIRECTORY", default_value = STAGING_DIR)]
    pub directory: PathBuf,

    /// TOML file with the supply policy (enabled entities, filters, locales)
    #[arg(long, global = true, env = "GEONAMES_POLICY")]
    pub policy: Option<PathBuf>,

    /// Base URL of the GeoNames dump directory
    #[arg(long, global = true, env = "GEONAMES_BASE_URL", default_value = GEONAMES_BASE_URL)]
    pub base_url: String,

    /// Rows buffered per table before a batch write
    #[arg(long, global = true, default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the full dataset and supply every enabled entity kind
    Supply {
        /// Download again even if a local copy exists
        #[arg(long)]
        force: bool,

        /// Retain staged downloads after the run
        #[arg(long)]
        keep_files: bool,

        /// Skip the translation stage
        #[arg(long)]
        without_translations: bool,
    },
    /// Apply the daily modifications and deletes feeds
    Update {
        /// Retain staged downloads after the run
        #[arg(long)]
        keep_files: bool,

        /// Skip the translation stage
        #[arg(long)]
        without_translations: bool,

        /// Feed date (YYYY-MM-DD); defaults to yesterday (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl Opt {
    /// Builds the library configuration, loading the policy file if one was given.
    pub fn to_config(&self) -> Result<Config, SupplyError> {
        let policy = match &self.policy {
            Some(path) => Policy::from_file(path)?,
            None => Policy::default(),
        };
        if self.batch_size == 0 {
            return Err(SupplyError::Config("batch size must be positive".into()));
        }
        Ok(Config {
            db_path: self.db.clone(),
            directory: self.directory.clone(),
            base_url: self.base_url.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            batch_size: self.batch_size,
            policy,
            ..Default::default()
        })
    }
}
