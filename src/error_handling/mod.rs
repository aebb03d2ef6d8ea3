//! Error handling.
//!
//! This module provides:
//! - Error type definitions for every failure class of the pipeline
//!   (download, parse, referential, store, configuration)
//! - Retry strategy configuration for downloads
//! - Classification of transient vs permanent download failures

mod categorization;
mod types;

// Re-export public API
pub use categorization::{get_retry_strategy, is_retriable};
pub use types::{
    DatabaseError, DownloadError, InitializationError, ParseError, ReferentialError, SupplyError,
};
