// Shared test helpers for GeoNames fixtures, mock servers and run configuration.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::Path;

use geonames_sync::reader::{Schema, COUNTRY_INFO, GEONAMES};
use geonames_sync::{Config, LogFormat, LogLevel, Policy};
use httptest::{matchers::*, responders::*, Expectation, Server};
use sqlx::SqlitePool;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Renders one tab-delimited line of `schema`; unspecified columns are empty.
pub fn line(schema: &Schema, pairs: &[(&str, &str)]) -> String {
    let mut values = vec![""; schema.columns.len()];
    for (column, value) in pairs {
        let index = schema
            .position(column)
            .unwrap_or_else(|| panic!("unknown column {}", column));
        values[index] = *value;
    }
    values.join("\t")
}

/// A GeoNames row with the given feature and population.
pub fn place(
    geoname_id: &str,
    name: &str,
    feature: (&str, &str),
    iso: &str,
    admin1: &str,
    population: &str,
) -> String {
    line(
        &GEONAMES,
        &[
            ("geonameid", geoname_id),
            ("name", name),
            ("asciiname", name),
            ("latitude", "41.89193"),
            ("longitude", "12.51133"),
            ("feature class", feature.0),
            ("feature code", feature.1),
            ("country code", iso),
            ("admin1 code", admin1),
            ("population", population),
            ("timezone", "Europe/Rome"),
            ("modification date", "2024-02-01"),
        ],
    )
}

#[allow(dead_code)] // Used by other test files
pub fn continent(geoname_id: &str, name: &str) -> String {
    place(geoname_id, name, ("L", "CONT"), "", "", "0")
}

#[allow(dead_code)]
pub fn country(geoname_id: &str, iso: &str, name: &str) -> String {
    place(geoname_id, name, ("A", "PCLI"), iso, "00", "1000000")
}

#[allow(dead_code)]
pub fn division(geoname_id: &str, iso: &str, admin1: &str, name: &str) -> String {
    place(geoname_id, name, ("A", "ADM1"), iso, admin1, "0")
}

#[allow(dead_code)]
pub fn city(geoname_id: &str, iso: &str, admin1: &str, name: &str, population: &str) -> String {
    place(geoname_id, name, ("P", "PPLA"), iso, admin1, population)
}

/// A countryInfo row. ISO3 is the code followed by `X`.
#[allow(dead_code)]
pub fn country_info(geoname_id: &str, iso: &str, name: &str, continent: &str) -> String {
    let iso3 = format!("{}X", iso);
    line(
        &COUNTRY_INFO,
        &[
            ("ISO", iso),
            ("ISO3", iso3.as_str()),
            ("ISO-Numeric", "380"),
            ("Country", name),
            ("Continent", continent),
            ("geonameid", geoname_id),
        ],
    )
}

/// Joins `lines` into a newline-terminated file body.
pub fn body(lines: &[String]) -> Vec<u8> {
    let mut text = lines.join("\n");
    text.push('\n');
    text.into_bytes()
}

/// Zip archive bytes holding a single entry.
#[allow(dead_code)]
pub fn zipped(entry: &str, content: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file(entry, FileOptions::default())
        .expect("Failed to start zip entry");
    writer.write_all(content).expect("Failed to write zip entry");
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// Serves `content` at `path` for any number of requests.
pub fn serve(server: &Server, path: &'static str, content: Vec<u8>) {
    server.expect(
        Expectation::matching(request::method_path("GET", path))
            .times(..)
            .respond_with(status_code(200).body(content)),
    );
}

/// Run configuration pointing at `server` with everything under `dir`.
pub fn test_config(server: &Server, dir: &Path, policy: Policy) -> Config {
    Config {
        db_path: dir.join("world.db"),
        directory: dir.join("staging"),
        base_url: server.url_str("/dump/"),
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
        batch_size: 2,
        policy,
        ..Default::default()
    }
}

/// Opens the database a run wrote.
#[allow(dead_code)]
pub async fn open_db(path: &Path) -> SqlitePool {
    SqlitePool::connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to open test database")
}

/// Number of rows in `table`.
#[allow(dead_code)]
pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
