//! Feature-code classification of GeoNames rows.
//!
//! The main dump and the daily modifications feed mix every kind of feature.
//! These predicates decide which entity kind, if any, a row belongs to. The
//! suppliers use the same predicates in their filters, so a row is routed to
//! exactly the supplier that would accept it during a full load.

use crate::models::EntityKind;
use crate::reader::Record;

use super::country_info::CountryInfoTable;

/// Feature code of continents
pub const CONTINENT_CODE: &str = "CONT";

/// Feature codes of independent, dependent and semi-independent political
/// entities, plus territories.
pub const COUNTRY_CODES: &[&str] = &["PCL", "PCLD", "PCLF", "PCLI", "PCLIX", "PCLS", "TERR"];

/// First-order administrative division
pub const DIVISION_CODE: &str = "ADM1";

/// Populated-place feature codes supplied as cities.
///
/// Excluded on purpose: `PPLX` (section of a populated place), `PPLH`
/// (historical), `PPLQ` (abandoned), `PPLW` (destroyed), `PPLCH` (historical
/// capital), `STLMT` (Israeli settlement).
pub const CITY_CODES: &[&str] = &[
    "PPL", "PPLA", "PPLA2", "PPLA3", "PPLA4", "PPLA5", "PPLC", "PPLF", "PPLG", "PPLL", "PPLR",
    "PPLS",
];

const POPULATED_PLACE_CLASS: &str = "P";

fn feature_code(record: &Record) -> Option<&str> {
    record.text("feature code")
}

pub fn is_continent(record: &Record) -> bool {
    feature_code(record) == Some(CONTINENT_CODE)
}

pub fn is_country(record: &Record) -> bool {
    feature_code(record).is_some_and(|code| COUNTRY_CODES.contains(&code))
}

pub fn is_division(record: &Record) -> bool {
    feature_code(record) == Some(DIVISION_CODE)
}

pub fn is_city(record: &Record) -> bool {
    record.text("feature class") == Some(POPULATED_PLACE_CLASS)
        && feature_code(record).is_some_and(|code| CITY_CODES.contains(&code))
}

/// Determines the entity kind of a row.
///
/// Membership in the country-info table wins over the feature code: a few
/// countries and territories carry codes outside the `PCL*` family.
pub fn classify(record: &Record, country_info: &CountryInfoTable) -> Option<EntityKind> {
    if let Ok(Some(geoname_id)) = record.integer("geonameid") {
        if country_info.contains(geoname_id) {
            return Some(EntityKind::Country);
        }
    }
    if is_continent(record) {
        Some(EntityKind::Continent)
    } else if is_country(record) {
        Some(EntityKind::Country)
    } else if is_division(record) {
        Some(EntityKind::Division)
    } else if is_city(record) {
        Some(EntityKind::City)
    } else {
        None
    }
}
