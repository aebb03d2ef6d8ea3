//! Country attributes from `countryInfo.txt`.
//!
//! The main dump only carries coordinates and population for a country. ISO
//! codes, currency, phone prefix and the continent a country belongs to come
//! from this side file, keyed by geoname id.

use std::collections::HashMap;

use log::info;

use crate::error_handling::SupplyError;
use crate::reader::{FileReader, Record, COUNTRY_INFO};

/// One row of `countryInfo.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    pub geoname_id: i64,
    pub iso: String,
    pub iso3: String,
    pub iso_numeric: String,
    pub fips: Option<String>,
    pub name: String,
    pub capital: Option<String>,
    pub area: Option<f64>,
    pub population: Option<i64>,
    /// Continent code (`EU`)
    pub continent: String,
    pub tld: Option<String>,
    pub currency_code: Option<String>,
    pub currency_name: Option<String>,
    pub phone: Option<String>,
    pub postal_code_format: Option<String>,
    pub postal_code_regex: Option<String>,
    pub languages: Option<String>,
    pub neighbours: Option<String>,
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

impl CountryInfo {
    pub fn from_record(record: &Record) -> Result<Self, SupplyError> {
        Ok(Self {
            geoname_id: record.required_integer("geonameid")?,
            iso: record.required_text("ISO")?.to_uppercase(),
            iso3: record.required_text("ISO3")?.to_string(),
            iso_numeric: record.required_text("ISO-Numeric")?.to_string(),
            fips: owned(record.text("fips")),
            name: record.required_text("Country")?.to_string(),
            capital: owned(record.text("Capital")),
            area: record.float("Area(in sq km)")?,
            population: record.integer("Population")?,
            continent: record.required_text("Continent")?.to_string(),
            tld: owned(record.text("tld")),
            currency_code: owned(record.text("CurrencyCode")),
            currency_name: owned(record.text("CurrencyName")),
            phone: owned(record.text("Phone")),
            postal_code_format: owned(record.text("Postal Code Format")),
            postal_code_regex: owned(record.text("Postal Code Regex")),
            languages: owned(record.text("Languages")),
            neighbours: owned(record.text("neighbours")),
        })
    }
}

/// Country attributes keyed by geoname id.
#[derive(Debug, Clone, Default)]
pub struct CountryInfoTable {
    by_geoname_id: HashMap<i64, CountryInfo>,
}

impl CountryInfoTable {
    /// Reads every row of a `countryInfo.txt` file.
    pub async fn load(reader: &FileReader) -> Result<Self, SupplyError> {
        let mut table = Self::default();
        let mut stream = reader.open().await?;
        while let Some(record) = stream.next_record().await? {
            let country = CountryInfo::from_record(&record)?;
            table.by_geoname_id.insert(country.geoname_id, country);
        }
        info!(
            "Loaded {} countries from {}",
            table.len(),
            reader.path().display()
        );
        Ok(table)
    }

    pub fn get(&self, geoname_id: i64) -> Option<&CountryInfo> {
        self.by_geoname_id.get(&geoname_id)
    }

    pub fn contains(&self, geoname_id: i64) -> bool {
        self.by_geoname_id.contains_key(&geoname_id)
    }

    pub fn len(&self) -> usize {
        self.by_geoname_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_geoname_id.is_empty()
    }

    /// Minimal table from `(geoname_id, iso, continent)` triples.
    #[cfg(test)]
    pub(crate) fn from_entries<const N: usize>(entries: [(i64, &str, &str); N]) -> Self {
        let by_geoname_id = entries
            .into_iter()
            .map(|(geoname_id, iso, continent)| {
                (
                    geoname_id,
                    CountryInfo {
                        geoname_id,
                        iso: iso.to_string(),
                        iso3: format!("{}X", iso),
                        iso_numeric: "000".to_string(),
                        fips: None,
                        name: format!("Country {}", iso),
                        capital: None,
                        area: None,
                        population: None,
                        continent: continent.to_string(),
                        tld: None,
                        currency_code: None,
                        currency_name: None,
                        phone: None,
                        postal_code_format: None,
                        postal_code_regex: None,
                        languages: None,
                        neighbours: None,
                    },
                )
            })
            .collect();
        Self { by_geoname_id }
    }
}
