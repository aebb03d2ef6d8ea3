//! Run orchestration.
//!
//! A run is a strictly sequential list of [`Stage`]s. The full supply walks
//! `Init → DownloadCountryInfo → DownloadDumps → Supply →
//! TriggerTranslationUpdate → Cleanup → Done`; the daily update walks
//! `Init → DownloadCountryInfo → ApplyModifications → ApplyDeletes →
//! TriggerTranslationUpdate → Cleanup → Done`. The first failing stage halts
//! the run and is named in the returned [`StageError`]. Writes committed by
//! earlier stages are kept.

mod finalize;
mod init;
mod resources;
mod supply;
mod translations;
mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Policy};
use crate::download::Downloader;
use crate::error_handling::SupplyError;
use crate::supply::SupplyReport;

pub use finalize::finalize_run;
pub use init::init_run_resources;
pub use resources::RunResources;
pub use supply::{SupplyOptions, SupplyWorkflow};
pub use translations::{LoggingTranslations, TranslationSync};
pub use update::{default_feed_date, UpdateOptions, UpdateWorkflow};

/// Stages of a supply or update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Init,
    DownloadCountryInfo,
    DownloadDumps,
    Supply,
    ApplyModifications,
    ApplyDeletes,
    TriggerTranslationUpdate,
    Cleanup,
    Done,
}

/// A run halted at `stage`.
#[derive(Error, Debug)]
#[error("{stage} stage failed")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: SupplyError,
}

/// Results of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-kind counters
    pub report: SupplyReport,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Asks the translation collaborator to refresh every enabled kind.
pub(crate) async fn trigger_translations<T: TranslationSync>(
    policy: &Policy,
    translations: &T,
) -> Result<(), SupplyError> {
    for kind in policy.enabled_kinds() {
        translations.sync(kind, &policy.translations).await?;
    }
    Ok(())
}

/// Removes staged files unless they are to be kept.
pub(crate) async fn cleanup_staged(
    downloader: &mut Downloader,
    keep_files: bool,
) -> Result<(), SupplyError> {
    if keep_files {
        info!(
            "Keeping {} staged files in {}",
            downloader.staged_files().len(),
            downloader.directory().display()
        );
        return Ok(());
    }
    downloader.cleanup().await?;
    Ok(())
}

/// Downloads the dataset and supplies every enabled entity kind.
///
/// # Errors
///
/// Returns an error naming the failing stage if initialization, a download,
/// or a supply stage fails.
pub async fn run_supply<T: TranslationSync>(
    config: Config,
    options: SupplyOptions,
    cancel: CancellationToken,
    translations: &T,
) -> Result<RunReport> {
    let mut resources = init_run_resources(config, cancel).await?;
    let report = SupplyWorkflow::new(
        &mut resources.service,
        &mut resources.downloader,
        &resources.resources,
        translations,
    )
    .run(&options)
    .await
    .context("Supply failed")?;
    finalize_run(resources, report).await
}

/// Applies the daily modifications and deletes feeds.
///
/// # Errors
///
/// Returns an error naming the failing stage.
pub async fn run_update<T: TranslationSync>(
    config: Config,
    options: UpdateOptions,
    cancel: CancellationToken,
    translations: &T,
) -> Result<RunReport> {
    let mut resources = init_run_resources(config, cancel).await?;
    info!("Updating from the {} feeds", options.date);
    let report = UpdateWorkflow::new(
        &mut resources.service,
        &mut resources.downloader,
        &resources.resources,
        translations,
    )
    .run(&options)
    .await
    .context("Update failed")?;
    finalize_run(resources, report).await
}
