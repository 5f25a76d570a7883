//! Record and zone data model.
//!
//! Desired records are built fresh from configuration on every run and
//! never persisted. Existing records come from a fresh provider listing;
//! their `id` is the only handle for mutation, name/type/value are
//! descriptive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key used to match desired records against existing state.
///
/// Not unique across a desired set: two desired records may target the
/// same key. Lookups into the existing-record index are always by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Hostname label
    pub name: String,
    /// Resource record type (e.g. `A`, `CNAME`, `TXT`)
    pub rtype: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.rtype)
    }
}

/// One record the operator wants to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    /// Hostname label, one trailing dot stripped at parse time
    pub name: String,
    /// Resource record type, case as supplied, not validated
    pub rtype: String,
    /// Record data
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Delete all existing records under the same key before applying
    pub overwrite: bool,
}

impl DesiredRecord {
    /// The `(name, type)` identity key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            name: self.name.clone(),
            rtype: self.rtype.clone(),
        }
    }
}

impl fmt::Display for DesiredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.name, self.ttl, self.rtype, self.value)
    }
}

/// A record as currently stored by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Opaque provider-assigned identifier, required for update/delete
    pub id: String,
    /// Id of the zone the record lives in
    pub zone_id: String,
    /// Resource record type
    #[serde(rename = "type")]
    pub rtype: String,
    /// Hostname label
    pub name: String,
    /// Record data
    pub value: String,
    /// Time-to-live in seconds; absent means the provider's zone default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl ExistingRecord {
    /// The `(name, type)` identity key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            name: self.name.clone(),
            rtype: self.rtype.clone(),
        }
    }
}

/// A DNS zone as known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned zone id
    pub id: String,
    /// Zone name (e.g. `example.com`)
    pub name: String,
}
