//! Hand-off to the translation subsystem.
//!
//! Alternate-name seeding lives outside this crate. A run only tells the
//! collaborator which entity kinds were refreshed and which locales to keep.

use log::info;

use crate::config::LocalePolicy;
use crate::error_handling::SupplyError;
use crate::models::EntityKind;

/// Refreshes translated names of one entity kind.
#[allow(async_fn_in_trait)]
pub trait TranslationSync {
    async fn sync(&self, kind: EntityKind, locales: &LocalePolicy) -> Result<(), SupplyError>;
}

/// Collaborator used when no translation subsystem is wired in: logs the
/// request and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTranslations;

impl TranslationSync for LoggingTranslations {
    async fn sync(&self, kind: EntityKind, locales: &LocalePolicy) -> Result<(), SupplyError> {
        info!(
            "Translation update requested for {} (locales: {}, untagged names: {})",
            kind,
            locales.locales.join(","),
            locales.nullable_language
        );
        Ok(())
    }
}
