// supply/registry.rs
// Fixed mapping from entity kind to supplier

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::Fields;

use super::city::CitySupplier;
use super::continent::ContinentSupplier;
use super::country::CountrySupplier;
use super::country_info::CountryInfoTable;
use super::division::DivisionSupplier;
use super::Supplier;

/// Any of the four suppliers.
pub enum AnySupplier {
    Continent(ContinentSupplier),
    Country(CountrySupplier),
    Division(DivisionSupplier),
    City(CitySupplier),
}

macro_rules! dispatch {
    ($self:expr, $supplier:ident => $call:expr) => {
        match $self {
            AnySupplier::Continent($supplier) => $call,
            AnySupplier::Country($supplier) => $call,
            AnySupplier::Division($supplier) => $call,
            AnySupplier::City($supplier) => $call,
        }
    };
}

impl Supplier for AnySupplier {
    fn kind(&self) -> EntityKind {
        dispatch!(self, s => s.kind())
    }

    async fn init(&mut self, pool: &SqlitePool) -> Result<(), SupplyError> {
        dispatch!(self, s => s.init(pool).await)
    }

    fn should_supply(&self, record: &Record, geoname_id: i64) -> bool {
        dispatch!(self, s => s.should_supply(record, geoname_id))
    }

    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        dispatch!(self, s => s.map_update_fields(record, geoname_id))
    }

    fn map_insert_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        dispatch!(self, s => s.map_insert_fields(record, geoname_id))
    }
}

/// Builds suppliers sharing one policy and one country-info table.
#[derive(Clone)]
pub struct SupplierRegistry {
    policy: Arc<Policy>,
    country_info: Arc<CountryInfoTable>,
}

impl SupplierRegistry {
    pub fn new(policy: Arc<Policy>, country_info: Arc<CountryInfoTable>) -> Self {
        Self {
            policy,
            country_info,
        }
    }

    /// Supplier for `kind`; call [`Supplier::init`] before use.
    pub fn build(&self, kind: EntityKind) -> AnySupplier {
        match kind {
            EntityKind::Continent => AnySupplier::Continent(ContinentSupplier::new()),
            EntityKind::Country => AnySupplier::Country(CountrySupplier::new(
                Arc::clone(&self.policy),
                Arc::clone(&self.country_info),
            )),
            EntityKind::Division => {
                AnySupplier::Division(DivisionSupplier::new(Arc::clone(&self.policy)))
            }
            EntityKind::City => AnySupplier::City(CitySupplier::new(Arc::clone(&self.policy))),
        }
    }
}
