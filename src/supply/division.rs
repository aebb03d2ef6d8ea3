// supply/division.rs
// First-order administrative divisions (ADM1)

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::{ReferentialError, SupplyError};
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::{load_country_ids, Fields};

use super::classify::is_division;
use super::mapping::{display_name, touched, with_elevation, with_location};
use super::Supplier;

pub struct DivisionSupplier {
    policy: Arc<Policy>,
    /// ISO country code → internal id
    countries: HashMap<String, i64>,
}

impl DivisionSupplier {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self {
            policy,
            countries: HashMap::new(),
        }
    }
}

impl Supplier for DivisionSupplier {
    fn kind(&self) -> EntityKind {
        EntityKind::Division
    }

    async fn init(&mut self, pool: &SqlitePool) -> Result<(), SupplyError> {
        self.countries = load_country_ids(pool).await?;
        Ok(())
    }

    fn should_supply(&self, record: &Record, geoname_id: i64) -> bool {
        if !is_division(record) {
            return false;
        }
        match record.text("country code") {
            Some(code) if self.policy.allows_country(code) => {
                let stored = self.countries.contains_key(code);
                if !stored {
                    trace!("Skipping division {}: country {} not stored", geoname_id, code);
                }
                stored
            }
            _ => false,
        }
    }

    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        let country_code = record.required_text("country code")?;
        let country_id = *self
            .countries
            .get(country_code)
            .ok_or_else(|| ReferentialError {
                kind: EntityKind::Division,
                geoname_id,
                parent: EntityKind::Country,
                key: country_code.to_string(),
            })?;

        let fields = Fields::new()
            .set("country_id", country_id)
            .set("name", display_name(record)?)
            .set("code", record.text("admin1 code"));
        Ok(touched(with_elevation(with_location(fields, record)?, record)?))
    }
}
