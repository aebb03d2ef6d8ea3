//! Column layouts of the GeoNames source files.
//!
//! Column names follow the headers GeoNames documents for each file, so mapping
//! code reads the same way the upstream readme does.

/// Fixed column layout of a tab-delimited source file.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl Schema {
    /// Position of `column`, if the schema declares it.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// Main dump (`allCountries.txt`, `XX.txt`) and the daily modifications feed.
pub static GEONAMES: Schema = Schema {
    name: "geonames",
    columns: &[
        "geonameid",
        "name",
        "asciiname",
        "alternatenames",
        "latitude",
        "longitude",
        "feature class",
        "feature code",
        "country code",
        "cc2",
        "admin1 code",
        "admin2 code",
        "admin3 code",
        "admin4 code",
        "population",
        "elevation",
        "dem",
        "timezone",
        "modification date",
    ],
};

/// `countryInfo.txt`
pub static COUNTRY_INFO: Schema = Schema {
    name: "country info",
    columns: &[
        "ISO",
        "ISO3",
        "ISO-Numeric",
        "fips",
        "Country",
        "Capital",
        "Area(in sq km)",
        "Population",
        "Continent",
        "tld",
        "CurrencyCode",
        "CurrencyName",
        "Phone",
        "Postal Code Format",
        "Postal Code Regex",
        "Languages",
        "geonameid",
        "neighbours",
        "EquivalentFipsCode",
    ],
};

/// Daily deletes feed (`deletes-YYYY-MM-DD.txt`)
pub static DELETES: Schema = Schema {
    name: "deletes",
    columns: &["geonameid", "name", "comment"],
};
