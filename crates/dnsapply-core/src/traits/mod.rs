//! Abstract interfaces consumed by the reconciler.
//!
//! - [`DnsProvider`]: zone lookup, record listing, record mutation against
//!   a remote DNS service

pub mod dns_provider;

pub use dns_provider::{DnsProvider, Pagination};
