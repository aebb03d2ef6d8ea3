//! Run resources.
//!
//! This module defines the `RunResources` struct which holds everything a
//! supply or update run needs once initialization has succeeded.

use std::time::Instant;

use crate::config::Config;
use crate::download::{Downloader, GeoNamesResources};
use crate::supply::SupplyService;

/// All resources initialized for a run.
pub struct RunResources {
    /// Supply service owning the database pool
    pub service: SupplyService,
    /// Downloader staging files into the configured directory
    pub downloader: Downloader,
    /// GeoNames resource descriptors resolved against the configured base URL
    pub resources: GeoNamesResources,
    /// Start time for elapsed time reporting
    pub start_time: Instant,
    /// Configuration the run was started with
    pub config: Config,
}
