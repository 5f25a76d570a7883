// # dnsapply-core
//
// Core library for the one-shot DNS record reconciler.
//
// ## Architecture Overview
//
// - **config**: environment-shaped settings and the record definition parser
// - **record**: desired/existing record and zone data model
// - **traits**: the `DnsProvider` interface the reconciler consumes
// - **reconciler**: desired-vs-observed diffing and the apply loop
// - **error**: crate-wide error type
//
// ## Design Principles
//
// 1. The reconciler owns the diff and nothing else; transport, auth and
//    payload handling live behind the `DnsProvider` trait.
// 2. No ambient state: configuration is an explicit value built once from
//    a key/value map, and the world is re-derived from a fresh listing on
//    every run.
// 3. Strictly sequential: one provider call at a time, no retries.

pub mod config;
pub mod error;
pub mod record;
pub mod reconciler;
pub mod traits;

// Re-export core types for convenience
pub use config::{RecordSpec, Settings};
pub use error::{Error, Result};
pub use record::{DesiredRecord, ExistingRecord, RecordKey, Zone};
pub use reconciler::{ReconcileReport, Reconciler};
pub use traits::{DnsProvider, Pagination};
