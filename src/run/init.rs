//! Run resource initialization.
//!
//! This module contains the `init_run_resources` function which handles all
//! setup before the first stage of a run begins.

use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::download::{Downloader, GeoNamesResources};
use crate::initialization::init_store;
use crate::supply::SupplyService;

use super::resources::RunResources;

/// Initialize all resources needed for a run.
///
/// 1. Validate the policy
/// 2. Open the database and create the tables of the enabled kinds
/// 3. Build the downloader, bound to `cancel`
/// 4. Resolve the GeoNames resources against the base URL
///
/// # Errors
///
/// Returns an error if any initialization step fails.
pub async fn init_run_resources(config: Config, cancel: CancellationToken) -> Result<RunResources> {
    config
        .policy
        .validate()
        .context("Configuration validation failed")?;

    let pool = init_store(&config)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready at {}", config.db_path.display());

    let downloader = Downloader::new(&config.directory, config.download_timeout)
        .context("Failed to initialize HTTP client")?
        .with_cancellation(cancel);

    let resources =
        GeoNamesResources::new(&config.base_url).context("Invalid GeoNames base URL")?;

    let enabled: Vec<&str> = config
        .policy
        .enabled_kinds()
        .iter()
        .map(|kind| kind.as_str())
        .collect();
    info!("Enabled entity kinds: {}", enabled.join(", "));
    if let Some(countries) = config.policy.country_filter() {
        let mut countries: Vec<String> = countries.into_iter().collect();
        countries.sort();
        info!("Country allow-list: {}", countries.join(", "));
    }

    let service = SupplyService::new(pool, config.policy.clone(), config.batch_size);

    Ok(RunResources {
        service,
        downloader,
        resources,
        start_time: Instant::now(),
        config,
    })
}
