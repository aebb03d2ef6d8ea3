// storage/batch.rs
// Batched database write operations keyed by geoname_id

use std::collections::HashSet;

use log::debug;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::models::EntityKind;

use super::fields::{bind_value, Fields};

/// Maximum ids bound in one `IN (...)` clause
const ID_CHUNK_SIZE: usize = 500;

/// Rows of one batch, already partitioned by whether their geoname_id is stored.
#[derive(Debug, Default)]
pub struct BatchRows {
    /// New rows; fields include `geoname_id` and creation metadata
    pub inserts: Vec<Fields>,
    /// Existing rows as `(geoname_id, fields)`
    pub updates: Vec<(i64, Fields)>,
}

impl BatchRows {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Returns the subset of `ids` already present in the table of `kind`.
pub async fn existing_geoname_ids(
    pool: &SqlitePool,
    kind: EntityKind,
    ids: &[i64],
) -> Result<HashSet<i64>, DatabaseError> {
    let mut existing = HashSet::with_capacity(ids.len());
    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT geoname_id FROM {} WHERE geoname_id IN (",
            kind.table()
        ));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let found: Vec<i64> = builder.build_query_scalar().fetch_all(pool).await?;
        existing.extend(found);
    }
    Ok(existing)
}

fn insert_sql(table: &str, fields: &Fields) -> String {
    let columns: Vec<&str> = fields.columns().collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

fn update_sql(table: &str, fields: &Fields) -> String {
    let assignments: Vec<String> = fields.columns().map(|c| format!("{} = ?", c)).collect();
    format!(
        "UPDATE {} SET {} WHERE geoname_id = ?",
        table,
        assignments.join(", ")
    )
}

/// Writes one batch in a single transaction.
///
/// Any failing statement rolls the whole batch back and is returned to the
/// caller; nothing is skipped.
pub async fn write_batch(
    pool: &SqlitePool,
    kind: EntityKind,
    rows: &BatchRows,
) -> Result<(), DatabaseError> {
    if rows.is_empty() {
        return Ok(());
    }
    let table = kind.table();
    let mut tx = pool.begin().await?;

    for fields in &rows.inserts {
        let sql = insert_sql(table, fields);
        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        query.execute(&mut *tx).await?;
    }

    for (geoname_id, fields) in &rows.updates {
        let sql = update_sql(table, fields);
        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = bind_value(query, value);
        }
        query.bind(*geoname_id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    debug!(
        "Wrote {} new and {} updated rows to {}",
        rows.inserts.len(),
        rows.updates.len(),
        table
    );
    Ok(())
}

/// Hard-deletes rows of `kind` by geoname_id. Returns the number of rows removed.
pub async fn delete_by_geoname_ids(
    pool: &SqlitePool,
    kind: EntityKind,
    ids: &[i64],
) -> Result<u64, DatabaseError> {
    let mut deleted = 0;
    let mut tx = pool.begin().await?;
    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "DELETE FROM {} WHERE geoname_id IN (",
            kind.table()
        ));
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        deleted += builder.build().execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;
    Ok(deleted)
}

/// Number of rows stored for `kind`.
pub async fn count_rows(pool: &SqlitePool, kind: EntityKind) -> Result<i64, DatabaseError> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", kind.table()))
        .fetch_one(pool)
        .await?;
    Ok(count)
}
