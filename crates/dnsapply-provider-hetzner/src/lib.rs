// # Hetzner DNS Provider
//
// `DnsProvider` implementation backed by the Hetzner DNS API.
//
// The client owns transport concerns only: header construction, JSON
// payloads, HTTP status mapping. It carries NO retry, backoff or caching;
// every call is a single round-trip and failures propagate to the
// reconciler, which decides fatal-vs-continue per step.
//
// ## API Reference
//
// - Hetzner DNS API v1: https://dns.hetzner.com/api-docs
// - List Zones: GET `/zones?name=...`
// - List Records: GET `/records?zone_id=...`
// - Create Record: POST `/records`
// - Update Record: PUT `/records/:id`
// - Delete Record: DELETE `/records/:id`
//
// Authentication is the `Auth-API-Token` header. The token never appears
// in logs or `Debug` output.

use async_trait::async_trait;
use dnsapply_core::record::{DesiredRecord, ExistingRecord, Zone};
use dnsapply_core::traits::{DnsProvider, Pagination};
use dnsapply_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Hetzner DNS API base URL
const HETZNER_API_BASE: &str = "https://dns.hetzner.com/api/v1";

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Hetzner DNS provider.
///
/// Stateless apart from the credential and the HTTP connection pool; safe
/// to share across calls, with no state carried between them.
pub struct HetznerProvider {
    api_token: String,
    base_url: String,
    client: reqwest::Client,
}

// The Debug implementation intentionally does not expose the API token.
impl std::fmt::Debug for HetznerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HetznerProvider {
    /// Create a new Hetzner provider from an API token.
    ///
    /// Fails fast on an empty token instead of producing 401s later.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Hetzner API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            base_url: HETZNER_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at a different API endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Auth-API-Token", &self.api_token)
    }

    /// Map a non-success status to the error taxonomy.
    async fn check(&self, response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error response".to_string());

        Err(match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "{what}: invalid API token or insufficient permissions (status {status})"
            )),
            404 => Error::not_found(format!("{what}: no such resource (status {status})")),
            422 => Error::validation(format!("{what}: request rejected: {body}")),
            429 => Error::rate_limited(format!("{what}: API rate limit exceeded")),
            500..=599 => Error::provider(
                "hetzner",
                format!("{what}: server error (transient): {status} - {body}"),
            ),
            _ => Error::provider("hetzner", format!("{what}: {status} - {body}")),
        })
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{what}: request failed: {e}")))?;
        let response = self.check(response, what).await?;

        response
            .json()
            .await
            .map_err(|e| Error::provider("hetzner", format!("{what}: failed to parse response: {e}")))
    }

    fn record_body(zone_id: &str, record: &DesiredRecord) -> serde_json::Value {
        serde_json::json!({
            "zone_id": zone_id,
            "type": record.rtype,
            "name": record.name,
            "value": record.value,
            "ttl": record.ttl,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    #[serde(default)]
    zones: Vec<Zone>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<ExistingRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    record: ExistingRecord,
}

#[async_trait]
impl DnsProvider for HetznerProvider {
    async fn list_zones(
        &self,
        name_filter: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Zone>> {
        let mut request = self.request(reqwest::Method::GET, "/zones");
        if let Some(name) = name_filter {
            request = request.query(&[("name", name)]);
        }
        if !pagination.is_unpaginated() {
            request = request.query(&[("page", pagination.page), ("per_page", pagination.per_page)]);
        }

        // The API answers 404 when the name filter matches nothing; that
        // is an empty result, not an error.
        match self.send_json::<ZonesResponse>(request, "zone listing").await {
            Ok(body) => Ok(body.zones),
            Err(Error::NotFound(_)) if name_filter.is_some() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn list_records(
        &self,
        zone_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<ExistingRecord>> {
        let mut request = self
            .request(reqwest::Method::GET, "/records")
            .query(&[("zone_id", zone_id)]);
        if !pagination.is_unpaginated() {
            request = request.query(&[("page", pagination.page), ("per_page", pagination.per_page)]);
        }

        let body: RecordsResponse = self.send_json(request, "record listing").await?;
        Ok(body.records)
    }

    async fn get_record_by_name(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Option<ExistingRecord>> {
        // The API has no by-name endpoint; scan the zone listing. A failed
        // listing propagates as an error, never as "not found".
        let records = self.list_records(zone_id, Pagination::all()).await?;
        Ok(records.into_iter().find(|record| record.name == name))
    }

    async fn create_or_update_record(
        &self,
        zone_id: &str,
        record: &DesiredRecord,
    ) -> Result<ExistingRecord> {
        // Upsert keyed on (name, type): the first match is updated in
        // place, otherwise a new record is created.
        let existing = self.list_records(zone_id, Pagination::all()).await?;

        if let Some(current) = existing
            .into_iter()
            .find(|r| r.name == record.name && r.rtype == record.rtype)
        {
            tracing::debug!("upsert matched record {}, updating in place", current.id);
            let updated = ExistingRecord {
                value: record.value.clone(),
                ttl: Some(record.ttl),
                ..current
            };
            return self.update_record(&updated).await;
        }

        tracing::debug!("upsert matched nothing for {record}, creating");
        self.create_record(zone_id, record).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &DesiredRecord,
    ) -> Result<ExistingRecord> {
        let request = self
            .request(reqwest::Method::POST, "/records")
            .json(&Self::record_body(zone_id, record));

        let body: RecordResponse = self.send_json(request, "record creation").await?;
        Ok(body.record)
    }

    async fn update_record(&self, record: &ExistingRecord) -> Result<ExistingRecord> {
        let request = self
            .request(reqwest::Method::PUT, &format!("/records/{}", record.id))
            .json(&serde_json::json!({
                "zone_id": record.zone_id,
                "type": record.rtype,
                "name": record.name,
                "value": record.value,
                "ttl": record.ttl,
            }));

        let body: RecordResponse = self.send_json(request, "record update").await?;
        Ok(body.record)
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        let request = self.request(reqwest::Method::DELETE, &format!("/records/{record_id}"));

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("record deletion: request failed: {e}")))?;
        self.check(response, "record deletion").await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "hetzner"
    }
}
