//! Test doubles and helpers shared by the reconciler behavior tests.
//!
//! `MockDnsProvider` serves canned zones and records, counts every call
//! via shared atomics, records the exact operation order, and can be told
//! to fail specific operations.

#![allow(dead_code)]

use dnsapply_core::error::{Error, Result};
use dnsapply_core::record::{DesiredRecord, ExistingRecord, RecordKey, Zone};
use dnsapply_core::traits::{DnsProvider, Pagination};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A provider operation as observed by the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    ListZones(Option<String>),
    ListRecords(String),
    Lookup(String),
    Upsert(RecordKey),
    Create(RecordKey),
    Update(String),
    Delete(String),
}

/// Mock DnsProvider with canned state, call counters and failure injection.
pub struct MockDnsProvider {
    zones: Vec<Zone>,
    records: Vec<ExistingRecord>,
    fail_deletes: HashSet<String>,
    fail_upserts: HashSet<RecordKey>,
    fail_create: bool,
    fail_update: bool,
    fail_lookup: bool,
    fail_record_listing: bool,
    ops: Arc<Mutex<Vec<Op>>>,
    list_zones_calls: Arc<AtomicUsize>,
    list_records_calls: Arc<AtomicUsize>,
    lookup_calls: Arc<AtomicUsize>,
    upsert_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            records: Vec::new(),
            fail_deletes: HashSet::new(),
            fail_upserts: HashSet::new(),
            fail_create: false,
            fail_update: false,
            fail_lookup: false,
            fail_record_listing: false,
            ops: Arc::new(Mutex::new(Vec::new())),
            list_zones_calls: Arc::new(AtomicUsize::new(0)),
            list_records_calls: Arc::new(AtomicUsize::new(0)),
            lookup_calls: Arc::new(AtomicUsize::new(0)),
            upsert_calls: Arc::new(AtomicUsize::new(0)),
            create_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_zone(mut self, id: &str, name: &str) -> Self {
        self.zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(mut self, record: ExistingRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Make delete fail for the given record id.
    pub fn failing_delete(mut self, record_id: &str) -> Self {
        self.fail_deletes.insert(record_id.to_string());
        self
    }

    /// Make create-or-update fail for the given key.
    pub fn failing_upsert(mut self, name: &str, rtype: &str) -> Self {
        self.fail_upserts.insert(RecordKey {
            name: name.to_string(),
            rtype: rtype.to_string(),
        });
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    /// Make get_record_by_name fail (a transport error, not "not found").
    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_record_listing(mut self) -> Self {
        self.fail_record_listing = true;
        self
    }

    /// Create a new mock that serves the same canned state and shares the
    /// counters and operation log with an existing one.
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            zones: other.zones.clone(),
            records: other.records.clone(),
            fail_deletes: other.fail_deletes.clone(),
            fail_upserts: other.fail_upserts.clone(),
            fail_create: other.fail_create,
            fail_update: other.fail_update,
            fail_lookup: other.fail_lookup,
            fail_record_listing: other.fail_record_listing,
            ops: Arc::clone(&other.ops),
            list_zones_calls: Arc::clone(&other.list_zones_calls),
            list_records_calls: Arc::clone(&other.list_records_calls),
            lookup_calls: Arc::clone(&other.lookup_calls),
            upsert_calls: Arc::clone(&other.upsert_calls),
            create_calls: Arc::clone(&other.create_calls),
            update_calls: Arc::clone(&other.update_calls),
            delete_calls: Arc::clone(&other.delete_calls),
        }
    }

    /// The observed operations, in call order.
    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn list_zones_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn list_records_calls(&self) -> usize {
        self.list_records_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn record_op(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(
        &self,
        name_filter: Option<&str>,
        _pagination: Pagination,
    ) -> Result<Vec<Zone>> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::ListZones(name_filter.map(str::to_string)));

        Ok(match name_filter {
            Some(filter) => self
                .zones
                .iter()
                .filter(|zone| zone.name == filter)
                .cloned()
                .collect(),
            None => self.zones.clone(),
        })
    }

    async fn list_records(
        &self,
        zone_id: &str,
        _pagination: Pagination,
    ) -> Result<Vec<ExistingRecord>> {
        self.list_records_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::ListRecords(zone_id.to_string()));

        if self.fail_record_listing {
            return Err(Error::http("record listing failed: connection reset by peer"));
        }

        Ok(self
            .records
            .iter()
            .filter(|record| record.zone_id == zone_id)
            .cloned()
            .collect())
    }

    async fn get_record_by_name(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Option<ExistingRecord>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::Lookup(name.to_string()));

        if self.fail_lookup {
            return Err(Error::http("lookup failed: connection reset by peer"));
        }

        Ok(self
            .records
            .iter()
            .find(|record| record.zone_id == zone_id && record.name == name)
            .cloned())
    }

    async fn create_or_update_record(
        &self,
        zone_id: &str,
        record: &DesiredRecord,
    ) -> Result<ExistingRecord> {
        let n = self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::Upsert(record.key()));

        if self.fail_upserts.contains(&record.key()) {
            return Err(Error::provider("mock", format!("upsert rejected: {record}")));
        }

        Ok(stored(&format!("upserted-{n}"), zone_id, record))
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &DesiredRecord,
    ) -> Result<ExistingRecord> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::Create(record.key()));

        if self.fail_create {
            return Err(Error::provider("mock", format!("create rejected: {record}")));
        }

        Ok(stored(&format!("created-{n}"), zone_id, record))
    }

    async fn update_record(&self, record: &ExistingRecord) -> Result<ExistingRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::Update(record.id.clone()));

        if self.fail_update {
            return Err(Error::provider("mock", format!("update rejected: {}", record.id)));
        }

        Ok(record.clone())
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.record_op(Op::Delete(record_id.to_string()));

        if self.fail_deletes.contains(record_id) {
            return Err(Error::provider("mock", format!("delete rejected: {record_id}")));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an existing record for canned provider state.
pub fn existing(id: &str, zone_id: &str, name: &str, rtype: &str, value: &str) -> ExistingRecord {
    ExistingRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        rtype: rtype.to_string(),
        name: name.to_string(),
        value: value.to_string(),
        ttl: Some(300),
    }
}

/// Build a desired record the way the parser would.
pub fn desired(name: &str, rtype: &str, value: &str, overwrite: bool) -> DesiredRecord {
    DesiredRecord {
        name: name.to_string(),
        rtype: rtype.to_string(),
        value: value.to_string(),
        ttl: 300,
        overwrite,
    }
}

fn stored(id: &str, zone_id: &str, record: &DesiredRecord) -> ExistingRecord {
    ExistingRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        rtype: record.rtype.clone(),
        name: record.name.clone(),
        value: record.value.clone(),
        ttl: Some(record.ttl),
    }
}
