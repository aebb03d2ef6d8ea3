//! In-memory parent tables.
//!
//! Suppliers resolve foreign keys against these maps instead of querying the
//! store once per row. They are loaded once per supply stage, after the parent
//! stage has committed.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;

/// Continent code (`EU`) → internal continent id.
pub async fn load_continent_ids(pool: &SqlitePool) -> Result<HashMap<String, i64>, DatabaseError> {
    let rows = sqlx::query("SELECT code, id FROM continents")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.get::<String, _>("code"), row.get::<i64, _>("id")))
        .collect())
}

/// ISO country code (`IT`) → internal country id.
pub async fn load_country_ids(pool: &SqlitePool) -> Result<HashMap<String, i64>, DatabaseError> {
    let rows = sqlx::query("SELECT code, id FROM countries")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.get::<String, _>("code"), row.get::<i64, _>("id")))
        .collect())
}

/// `(ISO country code, admin1 code)` → internal division id.
pub async fn load_division_ids(
    pool: &SqlitePool,
) -> Result<HashMap<(String, String), i64>, DatabaseError> {
    let rows = sqlx::query(
        "SELECT countries.code AS country_code, divisions.code AS division_code, divisions.id AS id
         FROM divisions
         JOIN countries ON countries.id = divisions.country_id
         WHERE divisions.code IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                (
                    row.get::<String, _>("country_code"),
                    row.get::<String, _>("division_code"),
                ),
                row.get::<i64, _>("id"),
            )
        })
        .collect())
}
