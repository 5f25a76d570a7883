//! Settings and the record definition parser.
//!
//! Configuration arrives as a flat key/value map, collected once by the
//! binary from the process environment and passed in by reference. No code
//! in this crate reads the ambient environment directly.
//!
//! Two input shapes share one schema, resolved at load time:
//!
//! - **Set**: zero or more groups `DNS_RECORD_<index>_<FIELD>` with
//!   `<FIELD>` one of NAME, TYPE, VALUE, TTL, OVERWRITE. Malformed keys
//!   and bad field values degrade per key, never fatally.
//! - **Single**: exactly one record from the fixed keys `DNS_RECORD_NAME`,
//!   `DNS_RECORD_TYPE`, `DNS_RECORD_VALUE`, `DNS_RECORD_TTL`. All four are
//!   required; any problem is a fatal configuration error.

use crate::error::{Error, Result};
use crate::record::DesiredRecord;
use std::collections::BTreeMap;
use tracing::warn;

/// Provider credential variable
pub const ENV_API_TOKEN: &str = "HETZNER_DNS_API_TOKEN";
/// Target zone variable
pub const ENV_ZONE_NAME: &str = "DNS_ZONE_NAME";
/// Optional log level variable (trace/debug/info/warn/error)
pub const ENV_LOG_LEVEL: &str = "DNS_LOG_LEVEL";
/// Prefix shared by all record definition variables
pub const RECORD_ENV_PREFIX: &str = "DNS_RECORD_";

/// Fixed keys of the single-record input shape. Presence of any of these
/// selects Single mode.
const SINGLE_RECORD_KEYS: [&str; 4] = [
    "DNS_RECORD_NAME",
    "DNS_RECORD_TYPE",
    "DNS_RECORD_VALUE",
    "DNS_RECORD_TTL",
];

/// How the desired records were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSpec {
    /// One record from the fixed keys; apply failures are fatal.
    Single(DesiredRecord),
    /// Indexed record groups; apply failures are counted, not fatal.
    Set(Vec<DesiredRecord>),
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider API credential. Never logged.
    pub api_token: String,
    /// Name of the zone to reconcile against
    pub zone_name: String,
    /// Log level for the tracing subscriber
    pub log_level: String,
    /// The desired records
    pub records: RecordSpec,
}

impl Settings {
    /// Load settings from a flat key/value map.
    ///
    /// Fatal errors name the offending key. Per-record problems in Set
    /// mode are diagnosed via `tracing` and degrade to a smaller apply
    /// set instead of failing the load.
    pub fn from_map(vars: &BTreeMap<String, String>) -> Result<Self> {
        let api_token = required(vars, ENV_API_TOKEN)?;
        let zone_name = required(vars, ENV_ZONE_NAME)?;

        let log_level = vars
            .get(ENV_LOG_LEVEL)
            .cloned()
            .unwrap_or_else(|| "info".to_string());
        match log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(Error::config(format!(
                    "{ENV_LOG_LEVEL} {other:?} is not valid (trace, debug, info, warn, error)"
                )));
            }
        }

        let records = parse_record_spec(vars)?;

        Ok(Self {
            api_token,
            zone_name,
            log_level,
            records,
        })
    }
}

fn required(vars: &BTreeMap<String, String>, key: &str) -> Result<String> {
    match vars.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(Error::config(format!("{key} is required"))),
    }
}

/// Resolve the input shape. The fixed single-record keys win over indexed
/// groups when both are present.
fn parse_record_spec(vars: &BTreeMap<String, String>) -> Result<RecordSpec> {
    if SINGLE_RECORD_KEYS.iter().any(|key| vars.contains_key(*key)) {
        return Ok(RecordSpec::Single(parse_single_record(vars)?));
    }

    Ok(RecordSpec::Set(parse_record_set(vars)))
}

fn parse_single_record(vars: &BTreeMap<String, String>) -> Result<DesiredRecord> {
    let name = required(vars, "DNS_RECORD_NAME")?;
    let rtype = required(vars, "DNS_RECORD_TYPE")?;
    let value = required(vars, "DNS_RECORD_VALUE")?;
    let ttl_raw = required(vars, "DNS_RECORD_TTL")?;
    let ttl = ttl_raw
        .parse()
        .map_err(|_| Error::config(format!("DNS_RECORD_TTL {ttl_raw:?} is not a valid TTL")))?;

    Ok(DesiredRecord {
        name: strip_trailing_dot(&name),
        rtype,
        value,
        ttl,
        overwrite: false,
    })
}

/// Accumulates the fields of one indexed group. TTL stays unset on a parse
/// failure; the group is only dropped when it is collected without one.
#[derive(Default)]
struct RecordBuilder {
    name: Option<String>,
    rtype: Option<String>,
    value: Option<String>,
    ttl: Option<u32>,
    overwrite: bool,
}

impl RecordBuilder {
    fn finish(self, index: &str) -> Option<DesiredRecord> {
        let Some(ttl) = self.ttl else {
            warn!("record group {index} has no usable TTL, dropping it");
            return None;
        };

        Some(DesiredRecord {
            name: self.name.unwrap_or_default(),
            rtype: self.rtype.unwrap_or_default(),
            value: self.value.unwrap_or_default(),
            ttl,
            overwrite: self.overwrite,
        })
    }
}

fn parse_record_set(vars: &BTreeMap<String, String>) -> Vec<DesiredRecord> {
    let mut groups: BTreeMap<String, RecordBuilder> = BTreeMap::new();

    for (key, value) in vars {
        if !key.starts_with(RECORD_ENV_PREFIX) {
            continue;
        }

        let segments: Vec<&str> = key.split('_').collect();
        if segments.len() != 4 {
            warn!("invalid number of parts in variable name {key}");
            continue;
        }

        let index = segments[2];
        let builder = groups.entry(index.to_string()).or_default();

        match segments[3] {
            "NAME" => builder.name = Some(strip_trailing_dot(value)),
            "TYPE" => builder.rtype = Some(value.clone()),
            "VALUE" => builder.value = Some(value.clone()),
            "TTL" => match value.parse() {
                Ok(ttl) => builder.ttl = Some(ttl),
                Err(_) => warn!("invalid value for record TTL: {value:?}"),
            },
            "OVERWRITE" => {
                builder.overwrite = match parse_bool(value) {
                    Some(flag) => flag,
                    None => {
                        warn!("invalid value for OVERWRITE: {value:?}");
                        false
                    }
                }
            }
            // Unknown fields are ignored without a diagnostic.
            _ => {}
        }
    }

    let mut indexed: Vec<(String, RecordBuilder)> = groups.into_iter().collect();
    indexed.sort_by_key(|(index, _)| index_sort_key(index));

    indexed
        .into_iter()
        .filter_map(|(index, builder)| builder.finish(&index))
        .collect()
}

/// Numeric indices first in numeric order, everything else after,
/// lexicographically. Keeps the apply order deterministic.
fn index_sort_key(index: &str) -> (u8, u64, String) {
    match index.parse::<u64>() {
        Ok(n) => (0, n, String::new()),
        Err(_) => (1, 0, index.to_string()),
    }
}

/// Strip at most one trailing dot from a record name.
fn strip_trailing_dot(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_string()
}

/// Boolean forms accepted for OVERWRITE: 1/0, t/f, true/false in the usual
/// capitalizations.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
