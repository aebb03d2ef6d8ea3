//! Supply policy: which entity kinds are stored and which rows are accepted.
//!
//! The policy is read-only once constructed. It can be built in code or loaded
//! from a TOML file:
//!
//! ```toml
//! population_threshold = 1000
//! countries = ["IT", "FR"]
//!
//! [entities]
//! city = false
//!
//! [translations]
//! enabled = true
//! locales = ["en", "it"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::constants::DEFAULT_POPULATION_THRESHOLD;
use crate::error_handling::SupplyError;
use crate::models::EntityKind;

/// Enabled flag per entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntityToggles {
    pub continent: bool,
    pub country: bool,
    pub division: bool,
    pub city: bool,
}

impl Default for EntityToggles {
    fn default() -> Self {
        Self {
            continent: true,
            country: true,
            division: true,
            city: true,
        }
    }
}

/// Locale filter handed to the translation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocalePolicy {
    pub enabled: bool,
    /// Locales to keep; `*` keeps every locale.
    pub locales: Vec<String>,
    /// Keep names without a language tag
    pub nullable_language: bool,
}

impl Default for LocalePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            locales: vec!["*".to_string()],
            nullable_language: false,
        }
    }
}

/// Read-only supply policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub entities: EntityToggles,
    /// Cities below this population are not supplied
    pub population_threshold: i64,
    /// ISO country codes to supply; empty means every country
    pub countries: Vec<String>,
    pub translations: LocalePolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            entities: EntityToggles::default(),
            population_threshold: DEFAULT_POPULATION_THRESHOLD,
            countries: Vec::new(),
            translations: LocalePolicy::default(),
        }
    }
}

impl Policy {
    /// Loads a policy from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, SupplyError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SupplyError::Config(format!("cannot read policy {}: {}", path.display(), e))
        })?;
        let policy: Policy = toml::from_str(&content).map_err(|e| {
            SupplyError::Config(format!("invalid policy {}: {}", path.display(), e))
        })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn is_enabled(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Continent => self.entities.continent,
            EntityKind::Country => self.entities.country,
            EntityKind::Division => self.entities.division,
            EntityKind::City => self.entities.city,
        }
    }

    /// Enabled kinds, parents first.
    pub fn enabled_kinds(&self) -> Vec<EntityKind> {
        EntityKind::hierarchy()
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Returns true when the ISO country code passes the allow-list.
    pub fn allows_country(&self, code: &str) -> bool {
        self.countries.is_empty()
            || self
                .countries
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(code))
    }

    /// Upper-cased allow-list, or `None` when every country is allowed.
    pub fn country_filter(&self) -> Option<HashSet<String>> {
        if self.countries.is_empty() {
            None
        } else {
            Some(self.countries.iter().map(|c| c.to_uppercase()).collect())
        }
    }

    /// Checks that every enabled kind has its ancestors enabled.
    ///
    /// A child row carries a required foreign key to its parent table, so a
    /// child kind cannot be stored when the parent table does not exist.
    pub fn validate(&self) -> Result<(), SupplyError> {
        for kind in self.enabled_kinds() {
            let mut ancestor = kind.parent();
            while let Some(parent) = ancestor {
                if !self.is_enabled(parent) {
                    return Err(SupplyError::Config(format!(
                        "{} is enabled but its ancestor {} is disabled",
                        kind, parent
                    )));
                }
                ancestor = parent.parent();
            }
        }
        if self.population_threshold < 0 {
            return Err(SupplyError::Config(format!(
                "population threshold must not be negative (got {})",
                self.population_threshold
            )));
        }
        Ok(())
    }
}
