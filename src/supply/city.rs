// supply/city.rs
// Populated places above the population threshold

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::{ReferentialError, SupplyError};
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::{load_country_ids, load_division_ids, Fields};

use super::classify::is_city;
use super::mapping::{display_name, touched, with_elevation, with_location};
use super::Supplier;

pub struct CitySupplier {
    policy: Arc<Policy>,
    /// ISO country code → internal id
    countries: HashMap<String, i64>,
    /// (ISO country code, admin1 code) → internal id
    divisions: HashMap<(String, String), i64>,
}

impl CitySupplier {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self {
            policy,
            countries: HashMap::new(),
            divisions: HashMap::new(),
        }
    }

    /// Population filter.
    ///
    /// An absent population only passes a zero threshold. An unparsable one
    /// passes so the mapping reports it instead of the row vanishing.
    fn meets_threshold(&self, record: &Record) -> bool {
        match record.integer("population") {
            Ok(Some(population)) => population >= self.policy.population_threshold,
            Ok(None) => self.policy.population_threshold <= 0,
            Err(_) => true,
        }
    }

    fn division_id(&self, country_code: &str, record: &Record) -> Option<i64> {
        let admin1 = record.text("admin1 code")?;
        self.divisions
            .get(&(country_code.to_string(), admin1.to_string()))
            .copied()
    }
}

impl Supplier for CitySupplier {
    fn kind(&self) -> EntityKind {
        EntityKind::City
    }

    async fn init(&mut self, pool: &SqlitePool) -> Result<(), SupplyError> {
        self.countries = load_country_ids(pool).await?;
        // Divisions may be disabled; cities then carry no division
        self.divisions = if self.policy.is_enabled(EntityKind::Division) {
            load_division_ids(pool).await?
        } else {
            HashMap::new()
        };
        Ok(())
    }

    fn should_supply(&self, record: &Record, geoname_id: i64) -> bool {
        if !is_city(record) {
            return false;
        }
        if !self.meets_threshold(record) {
            trace!("Skipping city {}: below population threshold", geoname_id);
            return false;
        }
        match record.text("country code") {
            Some(code) if self.policy.allows_country(code) => self.countries.contains_key(code),
            _ => false,
        }
    }

    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        let country_code = record.required_text("country code")?;
        let country_id = *self
            .countries
            .get(country_code)
            .ok_or_else(|| ReferentialError {
                kind: EntityKind::City,
                geoname_id,
                parent: EntityKind::Country,
                key: country_code.to_string(),
            })?;

        let fields = Fields::new()
            .set("country_id", country_id)
            .set("division_id", self.division_id(country_code, record))
            .set("name", display_name(record)?)
            .set("feature_code", record.text("feature code"));
        Ok(touched(with_elevation(with_location(fields, record)?, record)?))
    }
}
