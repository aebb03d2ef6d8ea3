//! Shared test helpers for storage and supply tests.
//!
//! This module provides common utilities for database setup and test data creation.

#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::config::Policy;
#[cfg(test)]
use crate::storage::ensure_schema;

/// Creates an in-memory pool with no tables.
///
/// A single connection keeps every query on the same in-memory database.
#[cfg(test)]
pub async fn create_empty_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool")
}

/// Creates an in-memory pool with every entity table.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    create_test_pool_with(&Policy::default()).await
}

/// Creates an in-memory pool with the tables of the kinds `policy` enables.
#[cfg(test)]
pub async fn create_test_pool_with(policy: &Policy) -> SqlitePool {
    let pool = create_empty_pool().await;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .expect("Failed to enable foreign keys");
    ensure_schema(&pool, policy)
        .await
        .expect("Failed to create schema");
    pool
}

/// Inserts a continent and returns its internal id.
#[cfg(test)]
pub async fn insert_test_continent(pool: &SqlitePool, geoname_id: i64, code: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO continents (geoname_id, code, name, created_at_ms, updated_at_ms)
         VALUES (?, ?, ?, 0, 0)
         RETURNING id",
    )
    .bind(geoname_id)
    .bind(code)
    .bind(format!("Continent {}", code))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test continent")
}

/// Inserts a country and returns its internal id.
#[cfg(test)]
pub async fn insert_test_country(
    pool: &SqlitePool,
    geoname_id: i64,
    code: &str,
    continent_id: i64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO countries (geoname_id, code, iso3, iso_numeric, name, name_official,
            continent_id, created_at_ms, updated_at_ms)
         VALUES (?, ?, ?, '000', ?, ?, ?, 0, 0)
         RETURNING id",
    )
    .bind(geoname_id)
    .bind(code)
    .bind(format!("{}X", code))
    .bind(format!("Country {}", code))
    .bind(format!("Republic of {}", code))
    .bind(continent_id)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test country")
}

/// Inserts a division and returns its internal id.
#[cfg(test)]
pub async fn insert_test_division(
    pool: &SqlitePool,
    geoname_id: i64,
    country_id: i64,
    code: &str,
    name: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO divisions (geoname_id, country_id, code, name, created_at_ms, updated_at_ms)
         VALUES (?, ?, ?, ?, 0, 0)
         RETURNING id",
    )
    .bind(geoname_id)
    .bind(country_id)
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test division")
}
