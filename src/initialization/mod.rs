//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - Database connection pool with the schema for the enabled entity kinds
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::error_handling::SupplyError;
use crate::storage::{ensure_schema, init_db_pool_with_path};

// Re-export public API
pub use logger::init_logger_with;

/// Opens the configured database and creates the tables of every enabled kind.
///
/// The policy is validated first so a child kind is never created without
/// its parent table.
pub async fn init_store(config: &Config) -> Result<SqlitePool, SupplyError> {
    config.policy.validate()?;
    let pool = init_db_pool_with_path(&config.db_path).await?;
    ensure_schema(&pool, &config.policy).await?;
    Ok(pool)
}
