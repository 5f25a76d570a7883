//! Desired-vs-observed reconciliation.
//!
//! The reconciler turns a set of desired records plus the provider's
//! current record listing into the minimal sequence of delete and upsert
//! calls, and applies them one at a time.
//!
//! ## Flow
//!
//! 1. Resolve the configured zone by exact name (fatal on a miss, after
//!    enumerating the zones that do exist).
//! 2. Build an in-memory index `(name, type)` → existing records from one
//!    fresh listing (fatal on failure).
//! 3. Walk the desired records in parser order and converge each.
//!
//! Set mode is best-effort: a failed delete or upsert is counted and the
//! loop moves on. Single mode is strict: the first failure ends the run.
//! Two concurrent runs against the same zone would race the
//! delete-then-create steps and the index bookkeeping; runs are safe only
//! serially.

use crate::config::RecordSpec;
use crate::error::{Error, Result};
use crate::record::{DesiredRecord, ExistingRecord, RecordKey, Zone};
use crate::traits::{DnsProvider, Pagination};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Outcome summary of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records created or updated
    pub applied: usize,
    /// Existing records deleted for overwrite or type changes
    pub deleted: usize,
    /// Operations that failed (Set mode only; Single mode fails the run)
    pub failed: usize,
}

impl ReconcileReport {
    /// True when every issued operation succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// The core reconciler. Owns a provider client and nothing else; all state
/// is re-derived per run.
pub struct Reconciler {
    provider: Box<dyn DnsProvider>,
}

impl Reconciler {
    pub fn new(provider: Box<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Run one reconciliation pass of `records` against `zone_name`.
    ///
    /// Returns the report on a completed pass (which may still contain
    /// per-record failures in Set mode), or the first fatal error.
    pub async fn run(&self, zone_name: &str, records: &RecordSpec) -> Result<ReconcileReport> {
        let zone = self.resolve_zone(zone_name).await?;
        info!("{}: zone id {}", zone.name, zone.id);

        match records {
            RecordSpec::Single(record) => self.apply_single(&zone, record).await,
            RecordSpec::Set(records) => self.apply_set(&zone, records).await,
        }
    }

    /// Resolve the configured zone by exact name.
    ///
    /// On a miss, every zone the credential can see is logged as operator
    /// guidance before the run is failed. No record listing or apply call
    /// happens after a failed resolution.
    async fn resolve_zone(&self, zone_name: &str) -> Result<Zone> {
        let zones = self
            .provider
            .list_zones(Some(zone_name), Pagination::default())
            .await?;

        if let Some(zone) = zones.into_iter().find(|zone| zone.name == zone_name) {
            return Ok(zone);
        }

        let available = self.provider.list_zones(None, Pagination::default()).await?;
        if available.is_empty() {
            warn!("no DNS zone available");
        }
        for zone in &available {
            info!("available zone: id={} name={}", zone.id, zone.name);
        }

        Err(Error::ZoneNotFound {
            zone: zone_name.to_string(),
        })
    }

    /// Build the `(name, type)` index over the zone's current records from
    /// one full listing.
    async fn load_record_index(
        &self,
        zone: &Zone,
    ) -> Result<HashMap<RecordKey, Vec<ExistingRecord>>> {
        let existing = self
            .provider
            .list_records(&zone.id, Pagination::all())
            .await?;

        let mut index: HashMap<RecordKey, Vec<ExistingRecord>> = HashMap::new();
        for record in existing {
            debug!(
                "found existing record: {} {} {:?} {} {}",
                record.id, record.name, record.ttl, record.rtype, record.value
            );
            index.entry(record.key()).or_default().push(record);
        }

        Ok(index)
    }

    /// Best-effort application of a record set. Individual delete/upsert
    /// failures are counted, never fatal; one bad record does not block
    /// the rest.
    async fn apply_set(&self, zone: &Zone, records: &[DesiredRecord]) -> Result<ReconcileReport> {
        let mut index = self.load_record_index(zone).await?;
        let mut report = ReconcileReport::default();

        for record in records {
            let key = record.key();

            if record.overwrite {
                // Removing the key clears the index entry, so a later
                // desired record under the same key re-deletes nothing.
                for existing in index.remove(&key).unwrap_or_default() {
                    info!("deleting existing record {}: {}", existing.id, key);
                    match self.provider.delete_record(&existing.id).await {
                        Ok(()) => report.deleted += 1,
                        Err(err) => {
                            warn!("failed to delete record {}: {err}", existing.id);
                            report.failed += 1;
                        }
                    }
                }
            }

            info!("applying record {record}");
            match self.provider.create_or_update_record(&zone.id, record).await {
                Ok(_) => report.applied += 1,
                Err(err) => {
                    warn!("failed to apply record {record}: {err}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Strict single-record application: every provider failure is fatal.
    ///
    /// A failed lookup is NOT absence — only a definitive not-found takes
    /// the create path.
    async fn apply_single(&self, zone: &Zone, record: &DesiredRecord) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        match self
            .provider
            .get_record_by_name(&zone.id, &record.name)
            .await?
        {
            Some(existing) if existing.rtype == record.rtype => {
                info!("updating record {} in place: {record}", existing.id);
                let updated = ExistingRecord {
                    value: record.value.clone(),
                    ttl: Some(record.ttl),
                    ..existing
                };
                self.provider.update_record(&updated).await?;
                report.applied += 1;
            }
            Some(existing) => {
                // The record type is immutable per provider identity, so a
                // type change is delete-then-create.
                info!(
                    "replacing record {} ({} -> {}): {record}",
                    existing.id, existing.rtype, record.rtype
                );
                self.provider.delete_record(&existing.id).await?;
                report.deleted += 1;
                self.provider.create_record(&zone.id, record).await?;
                report.applied += 1;
            }
            None => {
                info!("creating record {record}");
                self.provider.create_record(&zone.id, record).await?;
                report.applied += 1;
            }
        }

        Ok(report)
    }
}
