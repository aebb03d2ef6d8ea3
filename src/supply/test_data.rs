//! Source-file fixtures for supply tests.

use std::path::{Path, PathBuf};

use crate::reader::{Schema, COUNTRY_INFO, GEONAMES};

/// Renders one tab-delimited line of `schema`; unspecified columns are empty.
pub(crate) fn line(schema: &Schema, pairs: &[(&str, &str)]) -> String {
    let mut values = vec![""; schema.columns.len()];
    for (column, value) in pairs {
        let index = schema
            .position(column)
            .unwrap_or_else(|| panic!("unknown column {}", column));
        values[index] = *value;
    }
    values.join("\t")
}

pub(crate) fn continent(geoname_id: &str, name: &str) -> String {
    line(
        &GEONAMES,
        &[
            ("geonameid", geoname_id),
            ("name", name),
            ("asciiname", name),
            ("feature class", "L"),
            ("feature code", "CONT"),
            ("modification date", "2023-06-03"),
        ],
    )
}

pub(crate) fn country(geoname_id: &str, iso: &str, name: &str) -> String {
    line(
        &GEONAMES,
        &[
            ("geonameid", geoname_id),
            ("name", name),
            ("asciiname", name),
            ("feature class", "A"),
            ("feature code", "PCLI"),
            ("country code", iso),
            ("population", "1000000"),
            ("modification date", "2023-01-10"),
        ],
    )
}

pub(crate) fn division(geoname_id: &str, iso: &str, admin1: &str, name: &str) -> String {
    line(
        &GEONAMES,
        &[
            ("geonameid", geoname_id),
            ("name", name),
            ("asciiname", name),
            ("feature class", "A"),
            ("feature code", "ADM1"),
            ("country code", iso),
            ("admin1 code", admin1),
            ("modification date", "2024-01-17"),
        ],
    )
}

pub(crate) fn city(
    geoname_id: &str,
    iso: &str,
    admin1: &str,
    name: &str,
    population: &str,
) -> String {
    line(
        &GEONAMES,
        &[
            ("geonameid", geoname_id),
            ("name", name),
            ("asciiname", name),
            ("feature class", "P"),
            ("feature code", "PPL"),
            ("country code", iso),
            ("admin1 code", admin1),
            ("population", population),
            ("modification date", "2023-11-05"),
        ],
    )
}

pub(crate) fn country_info(geoname_id: &str, iso: &str, name: &str, continent: &str) -> String {
    let iso3 = format!("{}X", iso);
    line(
        &COUNTRY_INFO,
        &[
            ("ISO", iso),
            ("ISO3", iso3.as_str()),
            ("ISO-Numeric", "999"),
            ("Country", name),
            ("Continent", continent),
            ("geonameid", geoname_id),
        ],
    )
}

/// Writes `lines` to `dir/name` and returns the path.
pub(crate) fn write_file(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}
