// supply/country.rs
// Countries: main-dump rows merged with countryInfo.txt by geoname id

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::{ReferentialError, SupplyError};
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::{load_continent_ids, Fields};

use super::country_info::CountryInfoTable;
use super::mapping::{touched, with_elevation, with_location};
use super::Supplier;

pub struct CountrySupplier {
    policy: Arc<Policy>,
    country_info: Arc<CountryInfoTable>,
    /// Continent code → internal id
    continents: HashMap<String, i64>,
}

impl CountrySupplier {
    pub fn new(policy: Arc<Policy>, country_info: Arc<CountryInfoTable>) -> Self {
        Self {
            policy,
            country_info,
            continents: HashMap::new(),
        }
    }
}

impl Supplier for CountrySupplier {
    fn kind(&self) -> EntityKind {
        EntityKind::Country
    }

    async fn init(&mut self, pool: &SqlitePool) -> Result<(), SupplyError> {
        self.continents = load_continent_ids(pool).await?;
        Ok(())
    }

    /// A country is supplied only when `countryInfo.txt` describes it and its
    /// ISO code passes the allow-list.
    fn should_supply(&self, _record: &Record, geoname_id: i64) -> bool {
        match self.country_info.get(geoname_id) {
            Some(info) => {
                let allowed = self.policy.allows_country(&info.iso);
                if !allowed {
                    trace!("Skipping country {} ({}): not allowed", info.iso, geoname_id);
                }
                allowed
            }
            None => {
                trace!("Skipping country {}: not in country info", geoname_id);
                false
            }
        }
    }

    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        let info = self.country_info.get(geoname_id).ok_or_else(|| {
            SupplyError::Config(format!(
                "country {} has no country info; load countryInfo.txt first",
                geoname_id
            ))
        })?;
        let continent_id =
            *self
                .continents
                .get(&info.continent)
                .ok_or_else(|| ReferentialError {
                    kind: EntityKind::Country,
                    geoname_id,
                    parent: EntityKind::Continent,
                    key: info.continent.clone(),
                })?;

        let fields = Fields::new()
            .set("code", info.iso.as_str())
            .set("iso3", info.iso3.as_str())
            .set("iso_numeric", info.iso_numeric.as_str())
            .set("name", info.name.as_str())
            .set("name_official", record.required_text("name")?)
            .set("continent_id", continent_id)
            .set("capital", info.capital.clone())
            .set("currency_code", info.currency_code.clone())
            .set("currency_name", info.currency_name.clone())
            .set("tld", info.tld.clone())
            .set("phone_code", info.phone.clone())
            .set("postal_code_format", info.postal_code_format.clone())
            .set("postal_code_regex", info.postal_code_regex.clone())
            .set("languages", info.languages.clone())
            .set("neighbours", info.neighbours.clone())
            .set("area", info.area)
            .set("fips", info.fips.clone());
        let fields = with_elevation(with_location(fields, record)?, record)?;

        // The dump leaves population empty for a few territories
        let population = record.integer("population")?.or(info.population);
        Ok(touched(fields.set("population", population)))
    }
}
