//! Run finalization.
//!
//! This module contains the `finalize_run` function which handles cleanup
//! and result aggregation after the last stage completes.

use anyhow::Result;

use crate::supply::SupplyReport;

use super::resources::RunResources;
use super::RunReport;

/// Finalize a run and produce the final report.
///
/// 1. Checkpoint the WAL file
/// 2. Close the database pool
/// 3. Log per-kind counters
pub async fn finalize_run(resources: RunResources, report: SupplyReport) -> Result<RunReport> {
    let pool = resources.service.pool().clone();

    // Checkpoint WAL file for clean database state
    if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
        .execute(&pool)
        .await
    {
        log::warn!(
            "Failed to checkpoint WAL file (this is non-critical): {}",
            e
        );
    }

    pool.close().await;
    log::debug!("Database pool closed");

    for (kind, counts) in report.kinds() {
        log::info!(
            "{}: {} inserted, {} updated, {} skipped, {} deleted",
            kind,
            counts.inserted,
            counts.updated,
            counts.skipped,
            counts.deleted
        );
    }

    Ok(RunReport {
        report,
        db_path: resources.config.db_path.clone(),
        elapsed_seconds: resources.start_time.elapsed().as_secs_f64(),
    })
}
