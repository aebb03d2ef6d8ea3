//! Error type definitions.
//!
//! This module defines every error raised by the pipeline. Each error is fatal
//! for the current run: there is no per-row skip-and-continue recovery.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::models::EntityKind;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Failure to fetch or unpack a remote resource.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The transfer failed (connect, timeout, body read).
    #[error("transfer of {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body ended before `Content-Length` bytes arrived.
    #[error("{url} ended after {received} of {expected} bytes")]
    Incomplete {
        url: String,
        expected: u64,
        received: u64,
    },

    /// The downloaded archive could not be opened or read.
    #[error("archive {path} is corrupt or incomplete: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    /// The archive does not contain the expected file.
    #[error("archive {path} does not contain {entry}")]
    MissingEntry { path: PathBuf, entry: String },

    /// The resource URL could not be built.
    #[error("invalid resource URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The operator cancelled the download.
    #[error("download of {0} was cancelled")]
    Cancelled(String),

    /// Local file system failure while staging the download.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A source row does not match the declared column schema.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Wrong number of columns; the upstream format changed.
    #[error("{file}:{line}: expected {expected} columns, found {found}")]
    ColumnCount {
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A column value cannot be converted to its declared type.
    #[error("invalid value {value:?} for column '{column}'")]
    InvalidValue { column: String, value: String },

    /// A required column is empty.
    #[error("missing value for required column '{0}'")]
    MissingValue(String),

    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A foreign-key lookup found no parent entity.
#[derive(Error, Debug)]
#[error("{kind} {geoname_id} references unknown {parent} '{key}'")]
pub struct ReferentialError {
    pub kind: EntityKind,
    pub geoname_id: i64,
    pub parent: EntityKind,
    pub key: String,
}

/// Any failure of a supply or update run.
#[derive(Error, Debug)]
pub enum SupplyError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Referential(#[from] ReferentialError),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Initialization(#[from] InitializationError),

    /// Invalid configuration or policy.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for SupplyError {
    fn from(e: sqlx::Error) -> Self {
        SupplyError::Store(DatabaseError::SqlError(e))
    }
}
