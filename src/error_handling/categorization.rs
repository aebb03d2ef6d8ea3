//! Error categorization and retry strategy.
//!
//! This module decides which download failures are worth retrying and builds
//! the backoff schedule used between attempts.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{
    HTTP_STATUS_TOO_MANY_REQUESTS, RETRY_FACTOR, RETRY_INITIAL_DELAY_MS, RETRY_MAX_ATTEMPTS,
    RETRY_MAX_DELAY_SECS,
};

use super::types::DownloadError;

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
///
/// `ExponentialBackoff` raises its base to the attempt number and multiplies by
/// the factor, so the base is the growth rate and the factor scales it to the
/// initial delay (500ms, 1s, 2s, ...).
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(RETRY_FACTOR)
        .factor(RETRY_INITIAL_DELAY_MS / RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(RETRY_MAX_ATTEMPTS)
}

/// Determines if a download error is transient.
///
/// # Retriable
///
/// - Timeouts, connection failures and interrupted bodies
/// - Server errors (5xx HTTP status codes)
/// - Rate limiting (429 Too Many Requests)
///
/// # Non-Retriable
///
/// - Client errors (4xx except 429): the resource does not exist
/// - Corrupt archives and missing archive entries
/// - Local I/O failures, invalid URLs and cancellation
pub fn is_retriable(error: &DownloadError) -> bool {
    match error {
        DownloadError::Status { status, .. } => {
            *status == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(status)
        }
        DownloadError::Incomplete { .. } => true,
        DownloadError::Transport { source, .. } => {
            if let Some(status) = source.status() {
                let code = status.as_u16();
                return code == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&code);
            }
            !(source.is_redirect() || source.is_decode() || source.is_builder())
        }
        DownloadError::CorruptArchive { .. }
        | DownloadError::MissingEntry { .. }
        | DownloadError::InvalidUrl(_)
        | DownloadError::Cancelled(_)
        | DownloadError::Io { .. } => false,
    }
}
