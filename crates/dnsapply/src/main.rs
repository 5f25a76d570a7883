// # dnsapply
//
// One-shot reconciler: read record definitions from the environment, diff
// them against the configured Hetzner DNS zone, converge, exit.
//
// This binary is a thin wiring layer. All parsing and reconciliation
// logic lives in dnsapply-core; all Hetzner API plumbing lives in
// dnsapply-provider-hetzner.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `HETZNER_DNS_API_TOKEN`: provider credential (required)
// - `DNS_ZONE_NAME`: target zone (required)
// - `DNS_LOG_LEVEL`: trace/debug/info/warn/error, default info
//
// Record set form, one group per record:
//
// - `DNS_RECORD_<index>_NAME`
// - `DNS_RECORD_<index>_TYPE`
// - `DNS_RECORD_<index>_VALUE`
// - `DNS_RECORD_<index>_TTL`
// - `DNS_RECORD_<index>_OVERWRITE` (optional)
//
// Single record form (all four required):
//
// - `DNS_RECORD_NAME`, `DNS_RECORD_TYPE`, `DNS_RECORD_VALUE`,
//   `DNS_RECORD_TTL`
//
// ## Example
//
// ```bash
// export HETZNER_DNS_API_TOKEN=your_token
// export DNS_ZONE_NAME=example.com
// export DNS_RECORD_0_NAME=www
// export DNS_RECORD_0_TYPE=A
// export DNS_RECORD_0_VALUE=203.0.113.7
// export DNS_RECORD_0_TTL=300
// export DNS_RECORD_0_OVERWRITE=true
//
// dnsapply
// ```

use std::collections::BTreeMap;
use std::env;
use std::process::ExitCode;

use anyhow::Result;
use dnsapply_core::{ReconcileReport, Reconciler, RecordSpec, Settings};
use dnsapply_provider_hetzner::HetznerProvider;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the different termination scenarios
///
/// - 0: converged (or nothing to do)
/// - 1: configuration error
/// - 2: runtime error (zone resolution, record listing, or a fatal apply)
/// - 3: finished best-effort, but at least one record operation failed
#[derive(Debug, Clone, Copy)]
enum ApplyExitCode {
    /// Every requested operation succeeded, or there was nothing to do
    Converged = 0,
    /// Configuration error
    ConfigError = 1,
    /// Fatal runtime error
    RuntimeError = 2,
    /// Partial failure in best-effort mode
    PartialFailure = 3,
}

impl From<ApplyExitCode> for ExitCode {
    fn from(code: ApplyExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // The one place the ambient environment is read; everything below
    // works from this explicit map.
    let vars: BTreeMap<String, String> = env::vars().collect();

    let settings = match Settings::from_map(&vars) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ApplyExitCode::ConfigError.into();
        }
    };

    let level = match settings.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {e}");
        return ApplyExitCode::ConfigError.into();
    }

    if let RecordSpec::Set(records) = &settings.records {
        if records.is_empty() {
            info!("no record definitions found, nothing to do");
            return ApplyExitCode::Converged.into();
        }
        info!("loaded {} record definition(s)", records.len());
    }

    // One logical worker, strictly sequential provider calls.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return ApplyExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(&settings)) {
        Ok(report) if report.is_clean() => {
            info!(
                "reconciliation complete: {} applied, {} deleted",
                report.applied, report.deleted
            );
            ApplyExitCode::Converged.into()
        }
        Ok(report) => {
            warn!(
                "reconciliation finished with {} failed operation(s) ({} applied, {} deleted)",
                report.failed, report.applied, report.deleted
            );
            ApplyExitCode::PartialFailure.into()
        }
        Err(e) => {
            error!("reconciliation failed: {e:#}");
            ApplyExitCode::RuntimeError.into()
        }
    }
}

/// Wire the provider and the reconciler and run one pass.
async fn run(settings: &Settings) -> Result<ReconcileReport> {
    let provider = HetznerProvider::new(settings.api_token.clone())?;
    let reconciler = Reconciler::new(Box::new(provider));

    let report = reconciler
        .run(&settings.zone_name, &settings.records)
        .await?;
    Ok(report)
}
