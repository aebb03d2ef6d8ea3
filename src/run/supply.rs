//! Full supply workflow.

use std::path::PathBuf;

use log::info;

use crate::download::{Downloader, GeoNamesResources, Resource};
use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::supply::{SupplyFiles, SupplyReport, SupplyService};

use super::translations::TranslationSync;
use super::{cleanup_staged, trigger_translations, Stage, StageError};

/// Options of one full supply run.
#[derive(Debug, Clone, Default)]
pub struct SupplyOptions {
    /// Download again even if a local copy exists
    pub force: bool,
    /// Retain staged downloads after the run
    pub keep_files: bool,
    /// Run the translation stage (also requires translations in the policy)
    pub with_translations: bool,
}

/// Downloads the dataset and loads every enabled kind.
///
/// With an empty country allow-list the whole `allCountries` dump is used.
/// Otherwise only the listed countries' dumps are fetched, plus the
/// `no-country` dump that carries the continents.
pub struct SupplyWorkflow<'a, T: TranslationSync> {
    service: &'a mut SupplyService,
    downloader: &'a mut Downloader,
    resources: &'a GeoNamesResources,
    translations: &'a T,
    stage: Stage,
    files: SupplyFiles,
    report: SupplyReport,
}

impl<'a, T: TranslationSync> SupplyWorkflow<'a, T> {
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
            files: SupplyFiles::default(),
            report: SupplyReport::default(),
        }
    }

    /// Runs every remaining stage.
    ///
    /// # Errors
    ///
    /// Returns the first failure together with the stage it happened in.
    pub async fn run(mut self, options: &SupplyOptions) -> Result<SupplyReport, StageError> {
        while self.stage != Stage::Done {
            info!("Supply stage: {}", self.stage);
            let next = self.step(options).await.map_err(|source| StageError {
                stage: self.stage,
                source,
            })?;
            self.stage = next;
        }
        info!("Supply complete: {}", self.report);
        Ok(self.report)
    }

    /// Main dump resources for the current policy.
    fn dump_resources(&self) -> Result<Vec<Resource>, SupplyError> {
        let policy = self.service.policy();
        let Some(countries) = policy.country_filter() else {
            return Ok(vec![self.resources.all_countries()?]);
        };
        let mut codes: Vec<String> = countries.into_iter().collect();
        codes.sort();

        let mut dumps = Vec::with_capacity(codes.len() + 1);
        if policy.is_enabled(EntityKind::Continent) {
            dumps.push(self.resources.no_country()?);
        }
        for code in &codes {
            dumps.push(self.resources.country_dump(code)?);
        }
        Ok(dumps)
    }

    async fn step(&mut self, options: &SupplyOptions) -> Result<Stage, SupplyError> {
        match self.stage {
            Stage::Init => {
                self.service.policy().validate()?;
                if self.service.policy().is_enabled(EntityKind::Country) {
                    Ok(Stage::DownloadCountryInfo)
                } else {
                    Ok(Stage::DownloadDumps)
                }
            }
            Stage::DownloadCountryInfo => {
                let resource = self.resources.country_info()?;
                let path = self.downloader.fetch(&resource, options.force).await?;
                self.files.country_info = Some(path);
                Ok(Stage::DownloadDumps)
            }
            Stage::DownloadDumps => {
                let mut paths: Vec<PathBuf> = Vec::new();
                for resource in self.dump_resources()? {
                    paths.push(self.downloader.fetch(&resource, options.force).await?);
                }
                self.files.geonames = paths;
                Ok(Stage::Supply)
            }
            Stage::Supply => {
                let report = self.service.supply(&self.files).await?;
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
            // Not part of the supply sequence
            Stage::ApplyModifications | Stage::ApplyDeletes | Stage::Done => Ok(Stage::Done),
        }
    }
}
