// supply/mapping.rs
// Column mapping shared by every supplier of main-dump rows

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error_handling::SupplyError;
use crate::reader::Record;
use crate::storage::Fields;

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Display name of a row: the ASCII name when present, the UTF-8 name otherwise.
pub(crate) fn display_name(record: &Record) -> Result<String, SupplyError> {
    let name = match record.text("asciiname") {
        Some(ascii) => ascii,
        None => record.required_text("name")?,
    };
    Ok(name.to_string())
}

/// Adds the location columns every entity table carries.
pub(crate) fn with_location(fields: Fields, record: &Record) -> Result<Fields, SupplyError> {
    Ok(fields
        .set("latitude", record.float("latitude")?)
        .set("longitude", record.float("longitude")?)
        .set("population", record.integer("population")?)
        .set("timezone", record.text("timezone"))
        .set(
            "modified_at",
            record
                .date("modification date")?
                .map(|date| date.format("%Y-%m-%d").to_string()),
        ))
}

/// Adds the elevation columns of countries, divisions and cities.
pub(crate) fn with_elevation(fields: Fields, record: &Record) -> Result<Fields, SupplyError> {
    Ok(fields
        .set("elevation", record.integer("elevation")?)
        .set("dem", record.integer("dem")?))
}

/// Stamps the update time.
pub(crate) fn touched(fields: Fields) -> Fields {
    fields.set("updated_at_ms", now_ms())
}

/// Turns update fields into insert fields: identity and creation time.
pub(crate) fn created(fields: Fields, geoname_id: i64) -> Fields {
    fields
        .set("geoname_id", geoname_id)
        .set("created_at_ms", now_ms())
}
