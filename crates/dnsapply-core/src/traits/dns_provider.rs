//! # DNS Provider Trait
//!
//! The interface between the reconciler and a remote DNS service.
//! Implementations own transport, authentication and payload
//! (de)serialization; the reconciler owns nothing but the diff.
//!
//! Implementations must not retry or back off. A failed call is returned
//! as-is and the reconciler decides fatal-vs-continue per step. They must
//! also not spawn tasks or cache state across calls: every run re-derives
//! the world from a fresh listing.

use crate::error::Result;
use crate::record::{DesiredRecord, ExistingRecord, Zone};
use async_trait::async_trait;

/// Paging window for listing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number; 0 together with `per_page == 0` requests an
    /// unpaginated listing
    pub page: u32,
    /// Page size
    pub per_page: u32,
}

impl Pagination {
    /// Request an unpaginated listing (the provider returns everything).
    pub fn all() -> Self {
        Self {
            page: 0,
            per_page: 0,
        }
    }

    /// Whether this window asks for an unpaginated listing.
    pub fn is_unpaginated(&self) -> bool {
        self.page == 0 && self.per_page == 0
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
        }
    }
}

/// Trait for DNS provider implementations.
///
/// Implementations must be thread-safe (`Send + Sync`); the reconciler
/// itself issues calls strictly sequentially.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones whose name matches `name_filter` exactly, or all zones
    /// when no filter is given.
    async fn list_zones(
        &self,
        name_filter: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Zone>>;

    /// List records in a zone. `Pagination::all()` requests every record.
    async fn list_records(
        &self,
        zone_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ExistingRecord>>;

    /// Look up a single record by exact name within a zone.
    ///
    /// The outcome is tagged: `Ok(Some(_))` found, `Ok(None)` definitively
    /// absent, `Err(_)` the lookup itself failed. Callers must not treat a
    /// failed lookup as absence.
    async fn get_record_by_name(&self, zone_id: &str, name: &str)
    -> Result<Option<ExistingRecord>>;

    /// Idempotent upsert: create the record if no match for the provider's
    /// identity rules exists, else update the match in place. The caller
    /// never decides create-vs-update.
    async fn create_or_update_record(
        &self,
        zone_id: &str,
        record: &DesiredRecord,
    ) -> Result<ExistingRecord>;

    /// Create a record unconditionally.
    async fn create_record(&self, zone_id: &str, record: &DesiredRecord)
    -> Result<ExistingRecord>;

    /// Update a record in place, addressed by its id.
    async fn update_record(&self, record: &ExistingRecord) -> Result<ExistingRecord>;

    /// Delete a record by its id.
    async fn delete_record(&self, record_id: &str) -> Result<()>;

    /// Provider name for logging/debugging.
    fn provider_name(&self) -> &'static str;
}
