//! Per-kind counters of a supply, modify or delete run.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::EntityKind;

/// Counters for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindReport {
    pub inserted: u64,
    pub updated: u64,
    /// Rows of this kind rejected by the supplier's filter
    pub skipped: u64,
    pub deleted: u64,
}

impl KindReport {
    pub fn merge(&mut self, other: &KindReport) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
    }

    pub fn written(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Counters for every kind touched by a run, in hierarchy order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyReport {
    kinds: BTreeMap<EntityKind, KindReport>,
}

impl SupplyReport {
    /// Counters of `kind`; zero when the kind was not touched.
    pub fn get(&self, kind: EntityKind) -> KindReport {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn record(&mut self, kind: EntityKind, report: &KindReport) {
        self.kinds.entry(kind).or_default().merge(report);
    }

    pub fn merge(&mut self, other: &SupplyReport) {
        for (kind, report) in &other.kinds {
            self.record(*kind, report);
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = (EntityKind, &KindReport)> {
        self.kinds.iter().map(|(kind, report)| (*kind, report))
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.values().all(|r| *r == KindReport::default())
    }
}

impl fmt::Display for SupplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, r) in self.kinds() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(
                f,
                "{}: {} inserted, {} updated, {} skipped, {} deleted",
                kind, r.inserted, r.updated, r.skipped, r.deleted
            )?;
        }
        if first {
            f.write_str("nothing to do")?;
        }
        Ok(())
    }
}
