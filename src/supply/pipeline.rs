// supply/pipeline.rs
// Streams one source file through a supplier into batched upserts

use std::collections::HashMap;

use log::{debug, info};
use sqlx::SqlitePool;

use crate::config::LOGGING_INTERVAL;
use crate::error_handling::SupplyError;
use crate::reader::{FileReader, Record};
use crate::storage::{existing_geoname_ids, write_batch, BatchRows};

use super::classify::classify;
use super::country_info::CountryInfoTable;
use super::report::KindReport;
use super::Supplier;

/// Buffers accepted rows and writes them in batches of `batch_size`.
///
/// A geoname id seen twice before a flush keeps only its last row. Each flush
/// partitions the buffer into inserts and updates by asking the store which ids
/// already exist, maps the rows, then writes them in one transaction.
pub(crate) struct BatchWriter<'a, S: Supplier> {
    pool: &'a SqlitePool,
    supplier: &'a S,
    batch_size: usize,
    pending: Vec<(i64, Record)>,
    positions: HashMap<i64, usize>,
    report: KindReport,
}

impl<'a, S: Supplier> BatchWriter<'a, S> {
    pub(crate) fn new(pool: &'a SqlitePool, supplier: &'a S, batch_size: usize) -> Self {
        Self {
            pool,
            supplier,
            batch_size: batch_size.max(1),
            pending: Vec::with_capacity(batch_size.max(1)),
            positions: HashMap::new(),
            report: KindReport::default(),
        }
    }

    /// Offers a row to the supplier; accepted rows are buffered.
    pub(crate) async fn push(&mut self, record: Record) -> Result<(), SupplyError> {
        let geoname_id = record.required_integer("geonameid")?;
        if !self.supplier.should_supply(&record, geoname_id) {
            self.report.skipped += 1;
            return Ok(());
        }

        match self.positions.get(&geoname_id) {
            Some(&index) => self.pending[index] = (geoname_id, record),
            None => {
                self.positions.insert(geoname_id, self.pending.len());
                self.pending.push((geoname_id, record));
            }
        }

        if self.pending.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub(crate) async fn flush(&mut self) -> Result<(), SupplyError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let kind = self.supplier.kind();
        let ids: Vec<i64> = self.pending.iter().map(|(id, _)| *id).collect();
        let existing = existing_geoname_ids(self.pool, kind, &ids).await?;

        let mut rows = BatchRows::default();
        for (geoname_id, record) in self.pending.drain(..) {
            if existing.contains(&geoname_id) {
                let fields = self.supplier.map_update_fields(&record, geoname_id)?;
                rows.updates.push((geoname_id, fields));
            } else {
                rows.inserts.push(self.supplier.map_insert_fields(&record, geoname_id)?);
            }
        }
        self.positions.clear();

        write_batch(self.pool, kind, &rows).await?;
        self.report.inserted += rows.inserts.len() as u64;
        self.report.updated += rows.updates.len() as u64;
        debug!(
            "{}: flushed {} inserts and {} updates",
            kind,
            rows.inserts.len(),
            rows.updates.len()
        );
        Ok(())
    }

    /// Flushes the remainder and returns the counters.
    pub(crate) async fn finish(mut self) -> Result<KindReport, SupplyError> {
        self.flush().await?;
        Ok(self.report)
    }
}

/// Supplies every row of `reader` that classifies as the supplier's kind.
///
/// Rows of other kinds are passed over without being counted. The first error
/// aborts the pass; batches already committed stay committed.
pub(crate) async fn supply_file<S: Supplier>(
    pool: &SqlitePool,
    supplier: &S,
    reader: &FileReader,
    country_info: &CountryInfoTable,
    batch_size: usize,
) -> Result<KindReport, SupplyError> {
    let kind = supplier.kind();
    let mut writer = BatchWriter::new(pool, supplier, batch_size);
    let mut stream = reader.open().await?;
    let mut read = 0usize;

    while let Some(record) = stream.next_record().await? {
        read += 1;
        if read % LOGGING_INTERVAL == 0 {
            info!(
                "{}: {} rows read from {}",
                kind,
                read,
                reader.path().display()
            );
        }
        if classify(&record, country_info) != Some(kind) {
            continue;
        }
        writer.push(record).await?;
    }

    let report = writer.finish().await?;
    info!(
        "{}: {} inserted, {} updated, {} skipped from {}",
        kind,
        report.inserted,
        report.updated,
        report.skipped,
        reader.path().display()
    );
    Ok(report)
}
