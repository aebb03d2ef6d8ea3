// storage/schema.rs
// Table definitions for the enabled entity kinds

use log::info;
use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::DatabaseError;
use crate::models::EntityKind;

const CONTINENTS: &str = "CREATE TABLE IF NOT EXISTS continents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    geoname_id INTEGER NOT NULL UNIQUE,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    population INTEGER,
    timezone TEXT,
    modified_at TEXT,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL
)";

const COUNTRIES: &str = "CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    geoname_id INTEGER NOT NULL UNIQUE,
    code TEXT NOT NULL UNIQUE,
    iso3 TEXT NOT NULL,
    iso_numeric TEXT NOT NULL,
    name TEXT NOT NULL,
    name_official TEXT NOT NULL,
    continent_id INTEGER NOT NULL REFERENCES continents(id),
    capital TEXT,
    currency_code TEXT,
    currency_name TEXT,
    tld TEXT,
    phone_code TEXT,
    postal_code_format TEXT,
    postal_code_regex TEXT,
    languages TEXT,
    neighbours TEXT,
    area REAL,
    fips TEXT,
    latitude REAL,
    longitude REAL,
    population INTEGER,
    elevation INTEGER,
    dem INTEGER,
    timezone TEXT,
    modified_at TEXT,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL
)";

const DIVISIONS: &str = "CREATE TABLE IF NOT EXISTS divisions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    geoname_id INTEGER NOT NULL UNIQUE,
    country_id INTEGER NOT NULL REFERENCES countries(id),
    name TEXT NOT NULL,
    code TEXT,
    latitude REAL,
    longitude REAL,
    population INTEGER,
    elevation INTEGER,
    dem INTEGER,
    timezone TEXT,
    modified_at TEXT,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL
)";

/// Cities table; `division_id` only references `divisions` when that table exists.
fn cities_table(with_divisions: bool) -> String {
    let division_id = if with_divisions {
        "division_id INTEGER REFERENCES divisions(id) ON DELETE SET NULL"
    } else {
        "division_id INTEGER"
    };
    format!(
        "CREATE TABLE IF NOT EXISTS cities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    geoname_id INTEGER NOT NULL UNIQUE,
    country_id INTEGER NOT NULL REFERENCES countries(id),
    {},
    name TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    population INTEGER,
    elevation INTEGER,
    dem INTEGER,
    timezone TEXT,
    feature_code TEXT,
    modified_at TEXT,
    created_at_ms INTEGER NOT NULL,
    updated_at_ms INTEGER NOT NULL
)",
        division_id
    )
}

fn statements(kind: EntityKind, policy: &Policy) -> Vec<String> {
    match kind {
        EntityKind::Continent => vec![CONTINENTS.to_string()],
        EntityKind::Country => vec![
            COUNTRIES.to_string(),
            "CREATE INDEX IF NOT EXISTS idx_countries_continent ON countries(continent_id)".into(),
        ],
        EntityKind::Division => vec![
            DIVISIONS.to_string(),
            "CREATE INDEX IF NOT EXISTS idx_divisions_country_code ON divisions(country_id, code)"
                .into(),
        ],
        EntityKind::City => vec![
            cities_table(policy.is_enabled(EntityKind::Division)),
            "CREATE INDEX IF NOT EXISTS idx_cities_country ON cities(country_id)".into(),
            "CREATE INDEX IF NOT EXISTS idx_cities_division ON cities(division_id)".into(),
        ],
    }
}

/// Creates the tables of every enabled entity kind, parents first.
///
/// Disabled kinds get no table at all. Existing tables are left untouched.
pub async fn ensure_schema(pool: &SqlitePool, policy: &Policy) -> Result<(), DatabaseError> {
    for kind in policy.enabled_kinds() {
        for statement in statements(kind, policy) {
            sqlx::query(&statement).execute(pool).await?;
        }
        info!("Table {} ready", kind.table());
    }
    Ok(())
}

/// Returns true when the table for `kind` exists.
pub async fn table_exists(pool: &SqlitePool, kind: EntityKind) -> Result<bool, DatabaseError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(kind.table())
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}
