//! Daily update workflow.

use chrono::{NaiveDate, Utc};
use log::info;

use crate::download::{Downloader, GeoNamesResources};
use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::supply::{SupplyReport, SupplyService};

use super::translations::TranslationSync;
use super::{cleanup_staged, trigger_translations, Stage, StageError};

/// Date of the most recent complete feed: yesterday (UTC).
pub fn default_feed_date() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.pred_opt().unwrap_or(today)
}

/// Options of one update run.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Retain staged downloads after the run
    pub keep_files: bool,
    /// Run the translation stage (also requires translations in the policy)
    pub with_translations: bool,
    /// Date of the modifications and deletes feeds
    pub date: NaiveDate,
}

impl UpdateOptions {
    /// Options for the feeds of `date`, or of [`default_feed_date`] when `None`.
    pub fn new(keep_files: bool, with_translations: bool, date: Option<NaiveDate>) -> Self {
        Self {
            keep_files,
            with_translations,
            date: date.unwrap_or_else(default_feed_date),
        }
    }
}

/// Applies one day of upstream changes.
///
/// Stages run strictly in order and never go back. Deletes run after
/// modifications so a row modified and deleted on the same day ends up
/// deleted.
pub struct UpdateWorkflow<'a, T: TranslationSync> {
    service: &'a mut SupplyService,
    downloader: &'a mut Downloader,
    resources: &'a GeoNamesResources,
    translations: &'a T,
    stage: Stage,
    report: SupplyReport,
}

impl<'a, T: TranslationSync> UpdateWorkflow<'a, T> {
    pub fn new(
        service: &'a mut SupplyService,
        downloader: &'a mut Downloader,
        resources: &'a GeoNamesResources,
        translations: &'a T,
    ) -> Self {
        Self {
            service,
            downloader,
            resources,
            translations,
            stage: Stage::Init,
            report: SupplyReport::default(),
        }
    }

    /// Runs every remaining stage.
    ///
    /// # Errors
    ///
    /// Returns the first failure together with the stage it happened in.
    pub async fn run(mut self, options: &UpdateOptions) -> Result<SupplyReport, StageError> {
        while self.stage != Stage::Done {
            info!("Update stage: {}", self.stage);
            let next = self.step(options).await.map_err(|source| StageError {
                stage: self.stage,
                source,
            })?;
            self.stage = next;
        }
        info!("Update complete: {}", self.report);
        Ok(self.report)
    }

    async fn step(&mut self, options: &UpdateOptions) -> Result<Stage, SupplyError> {
        match self.stage {
            Stage::Init => {
                self.service.policy().validate()?;
                if self.service.policy().is_enabled(EntityKind::Country) {
                    Ok(Stage::DownloadCountryInfo)
                } else {
                    Ok(Stage::ApplyModifications)
                }
            }
            Stage::DownloadCountryInfo => {
                // Always fetched fresh: a kept copy may be days old
                let resource = self.resources.country_info()?;
                let path = self.downloader.fetch(&resource, true).await?;
                self.service.add_country_info(&path).await?;
                Ok(Stage::ApplyModifications)
            }
            Stage::ApplyModifications => {
                let resource = self.resources.modifications(options.date)?;
                let path = self.downloader.fetch(&resource, false).await?;
                let report = self.service.modify(&path).await?;
                self.report.merge(&report);
                Ok(Stage::ApplyDeletes)
            }
            Stage::ApplyDeletes => {
                let resource = self.resources.deletes(options.date)?;
                let path = self.downloader.fetch(&resource, false).await?;
                let report = self.service.delete(&path).await?;
                self.report.merge(&report);
                if options.with_translations && self.service.policy().translations.enabled {
                    Ok(Stage::TriggerTranslationUpdate)
                } else {
                    Ok(Stage::Cleanup)
                }
            }
            Stage::TriggerTranslationUpdate => {
                trigger_translations(self.service.policy(), self.translations).await?;
                Ok(Stage::Cleanup)
            }
            Stage::Cleanup => {
                cleanup_staged(self.downloader, options.keep_files).await?;
                Ok(Stage::Done)
            }
            // Not part of the update sequence
            Stage::DownloadDumps | Stage::Supply | Stage::Done => Ok(Stage::Done),
        }
    }
}
