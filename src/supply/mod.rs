//! Suppliers: turn GeoNames rows into stored entities.
//!
//! One supplier exists per [`EntityKind`]. Each loads the parent tables it
//! needs into memory in [`Supplier::init`], filters rows with
//! [`Supplier::should_supply`], and maps accepted rows into plain [`Fields`]
//! with every foreign key already resolved. A missing parent is reported as a
//! [`ReferentialError`](crate::error_handling::ReferentialError) before any
//! write is attempted.
//!
//! [`SupplyService`] drives the suppliers in hierarchy order for a full load
//! and exposes the incremental entry points used by the daily update.

mod city;
pub mod classify;
mod continent;
mod country;
mod country_info;
mod division;
mod mapping;
mod pipeline;
mod registry;
mod report;
mod service;
#[cfg(test)]
pub(crate) mod test_data;

use sqlx::SqlitePool;

use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::reader::Record;
use crate::storage::Fields;

pub use city::CitySupplier;
pub use continent::{continent_code, ContinentSupplier, CONTINENTS};
pub use country::CountrySupplier;
pub use country_info::{CountryInfo, CountryInfoTable};
pub use division::DivisionSupplier;
pub use registry::{AnySupplier, SupplierRegistry};
pub use report::{KindReport, SupplyReport};
pub use service::{SupplyFiles, SupplyService};

/// Shared contract of the four entity suppliers.
#[allow(async_fn_in_trait)]
pub trait Supplier {
    /// Entity kind this supplier writes.
    fn kind(&self) -> EntityKind;

    /// Loads the in-memory parent tables from the store.
    ///
    /// Must be called after the parent kinds have been committed and before
    /// any row is offered.
    async fn init(&mut self, pool: &SqlitePool) -> Result<(), SupplyError>;

    /// Returns true when the row passes this supplier's filters.
    fn should_supply(&self, record: &Record, geoname_id: i64) -> bool;

    /// Columns written when the row already exists.
    fn map_update_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError>;

    /// Columns written for a new row: the update columns plus identity and
    /// creation metadata.
    fn map_insert_fields(&self, record: &Record, geoname_id: i64) -> Result<Fields, SupplyError> {
        Ok(mapping::created(
            self.map_update_fields(record, geoname_id)?,
            geoname_id,
        ))
    }

    /// Table the supplier writes to.
    fn target_store(&self) -> &'static str {
        self.kind().table()
    }
}
