//! Configuration constants.
//!
//! This module defines the defaults used throughout the pipeline: file locations,
//! batch sizes, download limits and retry parameters.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./geonames.db";

/// Default staging directory for downloaded and extracted GeoNames files
pub const STAGING_DIR: &str = "./geonames";

/// Base URL of the GeoNames dump directory.
///
/// Every resource (full dump, per-country dumps, country info, daily feeds)
/// is resolved relative to this URL.
pub const GEONAMES_BASE_URL: &str = "https://download.geonames.org/export/dump/";

// Batching
/// Number of rows buffered per table before a write is issued.
/// GeoNames dumps run into millions of rows; 1000 keeps the transaction small
/// while amortizing the per-statement overhead.
pub const BATCH_SIZE: usize = 1000;

/// Progress is logged every this many records read from a source file
pub const LOGGING_INTERVAL: usize = 100_000;

// Supply policy defaults
/// Minimum population for a city to be supplied.
/// Matches the threshold of the `cities500` GeoNames extract.
pub const DEFAULT_POPULATION_THRESHOLD: i64 = 500;

// Network
/// Timeout for a single download attempt.
/// `allCountries.zip` is ~400MB, so this is deliberately generous.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent with every download request
pub const USER_AGENT: &str = concat!("geonames_sync/", env!("CARGO_PKG_VERSION"));

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Suffix of in-flight download files; renamed away once the transfer completes
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";
