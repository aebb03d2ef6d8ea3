// supply/continent.rs
// Continents: seven fixed rows identified by their geoname ids

use sqlx::SqlitePool;

use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::Fields;

use super::classify::is_continent;
use super::mapping::{display_name, touched, with_location};
use super::Supplier;

/// GeoNames continent geoname ids and the two-letter codes used by
/// `countryInfo.txt`.
pub const CONTINENTS: [(i64, &str); 7] = [
    (6255146, "AF"),
    (6255147, "AS"),
    (6255148, "EU"),
    (6255149, "NA"),
    (6255150, "SA"),
    (6255151, "OC"),
    (6255152, "AN"),
];

/// Continent code for a continent geoname id.
pub fn continent_code(geoname_id: i64) -> Option<&'static str> {
    CONTINENTS
        .iter()
        .find(|(id, _)| *id == geoname_id)
        .map(|(_, code)| *code)
}

#[derive(Debug, Default)]
pub struct ContinentSupplier;

impl ContinentSupplier {
    pub fn new() -> Self {
        Self
    }
}

impl Supplier for ContinentSupplier {
    fn kind(&self) -> EntityKind {
        EntityKind::Continent
    }

    async fn init(&mut self, _pool: &SqlitePool) -> Result<(), SupplyError> {
        Ok(())
    }

    fn should_supply(&self, record: &Record, geoname_id: i64) -> bool {
        is_continent(record) && continent_code(geoname_id).is_some()
    }

    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        let code = continent_code(geoname_id).ok_or_else(|| {
            SupplyError::Config(format!("{} is not a known continent", geoname_id))
        })?;
        let fields = Fields::new()
            .set("code", code)
            .set("name", display_name(record)?);
        Ok(touched(with_location(fields, record)?))
    }
}
