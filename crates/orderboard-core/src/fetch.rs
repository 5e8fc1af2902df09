//! Paginated, retrying reader for the sales-order listing.
//!
//! The network sits behind [`Transport`] so paging and retry behavior can be
//! driven by a scripted reply sequence. [`HttpTransport`] is the production
//! implementation on a blocking `reqwest` client.

use crate::config::{ApiConfig, Credentials};
use crate::error::{BoardError, Result};
use crate::fields::{self, RawOrderRecord, SALES_ORDER_FIELDS};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const SALES_ORDERS_PATH: &str = "/SalesOrders";

/// Server-side ordering requested for the listing.
pub const LISTING_ORDER: &str = "EstimatedDeliveryDate ASC, CreatedDate ASC";

/// Records inspected by [`log_diagnostics`].
const DIAGNOSTIC_SAMPLE: usize = 100;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A request that produced no HTTP status at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout(String),
    Connect(String),
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout(m) => write!(f, "request timed out: {m}"),
            TransportError::Connect(m) => write!(f, "connection failed: {m}"),
            TransportError::Other(m) => write!(f, "request failed: {m}"),
        }
    }
}

pub trait Transport {
    fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<HttpReply, TransportError>;
}

/// Basic-auth JSON client for the inventory API.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    username: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(creds: &Credentials, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: creds.base_url.trim_end_matches('/').to_string(),
            username: creds.username.clone(),
            api_key: creds.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<HttpReply, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(transport_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(transport_error)?;
        Ok(HttpReply { status, body })
    }
}

fn transport_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after a 429 on zero-based `attempt`.
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1) * 2
    }

    /// Wait after any other failure on zero-based `attempt`.
    pub fn failure_delay(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// `Stage<>'a' AND Stage<>'b'`, or `None` when nothing is excluded.
pub fn where_clause(excluded_stages: &[String]) -> Option<String> {
    if excluded_stages.is_empty() {
        return None;
    }
    let clauses: Vec<String> = excluded_stages
        .iter()
        .map(|s| format!("Stage<>'{}'", s.replace('\'', "''")))
        .collect();
    Some(clauses.join(" AND "))
}

pub fn build_query(page: u32, rows: usize, filter: Option<&str>) -> Vec<(String, String)> {
    let fields: Vec<&str> = SALES_ORDER_FIELDS.iter().map(|f| f.name).collect();
    let mut query = vec![
        ("fields".to_string(), fields.join(",")),
        ("order".to_string(), LISTING_ORDER.to_string()),
        ("page".to_string(), page.to_string()),
        ("rows".to_string(), rows.to_string()),
    ];
    if let Some(filter) = filter {
        query.push(("where".to_string(), filter.to_string()));
    }
    query
}

/// Records from a listing body: a bare array, a `data`/`Data` envelope, or a
/// single record object. `None` for any other shape.
pub fn extract_records(body: Value) -> Option<Vec<RawOrderRecord>> {
    match body {
        Value::Array(items) => Some(objects(items)),
        Value::Object(mut map) => {
            for key in ["data", "Data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Some(objects(items));
                }
            }
            if fields::resolve(&map, &fields::ID).is_some() {
                Some(vec![map])
            } else {
                None
            }
        }
        _ => None,
    }
}

fn objects(items: Vec<Value>) -> Vec<RawOrderRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// A page whose retries were exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub page: u32,
    pub attempts: u32,
    pub last_error: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} failed after {} attempt(s): {}",
            self.page, self.attempts, self.last_error
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawOrderRecord>,
    pub pages_fetched: u32,
    pub requests: u32,
    /// Set when a page could not be fetched; `records` holds the earlier pages.
    pub failure: Option<FetchFailure>,
    /// Set when the page ceiling stopped pagination.
    pub truncated: bool,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && !self.truncated
    }
}

/// Result of a single-row connection check.
#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub ok: bool,
    pub status: Option<u16>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

enum PageReply {
    Body(String),
    Failed(FetchFailure),
}

pub struct Fetcher<'a> {
    transport: &'a dyn Transport,
    policy: RetryPolicy,
    page_size: usize,
    max_pages: u32,
}

impl<'a> Fetcher<'a> {
    pub fn new(transport: &'a dyn Transport, api: &ApiConfig) -> Self {
        Self {
            transport,
            policy: RetryPolicy::new(api.max_retries, api.retry_delay()),
            page_size: api.page_size.max(1),
            max_pages: api.max_pages,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch every page of orders not in `excluded_stages`.
    ///
    /// Authentication failures are returned as errors. A page that exhausts
    /// its retries ends pagination and is reported in
    /// [`FetchOutcome::failure`] alongside the records already collected.
    pub fn fetch_all(&self, excluded_stages: &[String]) -> Result<FetchOutcome> {
        let filter = where_clause(excluded_stages);
        let mut outcome = FetchOutcome::default();
        let mut page: u32 = 1;

        loop {
            if page > self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    records = outcome.records.len(),
                    "page ceiling reached, results truncated"
                );
                outcome.truncated = true;
                break;
            }

            let query = build_query(page, self.page_size, filter.as_deref());
            let body = match self.request(SALES_ORDERS_PATH, &query, page, &mut outcome.requests)? {
                PageReply::Body(body) => body,
                PageReply::Failed(failure) => {
                    warn!(
                        page,
                        records = outcome.records.len(),
                        error = %failure.last_error,
                        "page fetch failed, keeping partial results"
                    );
                    outcome.failure = Some(failure);
                    break;
                }
            };

            let parsed = match serde_json::from_str::<Value>(&body) {
                Ok(v) => v,
                Err(e) => {
                    warn!(page, error = %e, "response body is not JSON, stopping");
                    break;
                }
            };
            let Some(batch) = extract_records(parsed) else {
                warn!(page, "unexpected response shape, stopping");
                break;
            };

            let count = batch.len();
            outcome.pages_fetched += 1;
            outcome.records.extend(batch);
            debug!(page, count, total = outcome.records.len(), "page fetched");

            if count < self.page_size {
                break;
            }
            page += 1;
        }

        info!(
            records = outcome.records.len(),
            pages = outcome.pages_fetched,
            requests = outcome.requests,
            complete = outcome.is_complete(),
            "fetch finished"
        );
        Ok(outcome)
    }

    /// One `rows=1` request. Only authentication failures are errors.
    pub fn ping(&self) -> Result<PingReport> {
        let query = build_query(1, 1, None);
        let report = match self.transport.get(SALES_ORDERS_PATH, &query) {
            Ok(reply) => match reply.status {
                200 => PingReport {
                    ok: true,
                    status: Some(200),
                    message: "connected".to_string(),
                },
                401 => return Err(BoardError::Unauthorized),
                403 => return Err(BoardError::Forbidden),
                status => PingReport {
                    ok: false,
                    status: Some(status),
                    message: format!("HTTP {status}: {}", snippet(&reply.body)),
                },
            },
            Err(e) => PingReport {
                ok: false,
                status: None,
                message: e.to_string(),
            },
        };
        Ok(report)
    }

    fn request(
        &self,
        path: &str,
        query: &[(String, String)],
        page: u32,
        requests: &mut u32,
    ) -> Result<PageReply> {
        let attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            *requests += 1;
            debug!(page, attempt = attempt + 1, "GET {path}");
            let last = attempt + 1 == attempts;

            let delay = match self.transport.get(path, query) {
                Ok(reply) => match reply.status {
                    200 => return Ok(PageReply::Body(reply.body)),
                    401 => return Err(BoardError::Unauthorized),
                    403 => return Err(BoardError::Forbidden),
                    429 => {
                        last_error = "rate limited (HTTP 429)".to_string();
                        self.policy.rate_limit_delay(attempt)
                    }
                    status => {
                        last_error = format!("HTTP {status}: {}", snippet(&reply.body));
                        self.policy.failure_delay(attempt)
                    }
                },
                Err(e) => {
                    last_error = e.to_string();
                    self.policy.failure_delay(attempt)
                }
            };

            if !last {
                warn!(
                    page,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "retrying request"
                );
                std::thread::sleep(delay);
            }
        }

        Ok(PageReply::Failed(FetchFailure {
            page,
            attempts,
            last_error,
        }))
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let cut: String = trimmed.chars().take(200).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

/// Debug-log the stages and distribution branches present in the first
/// fetched records.
pub fn log_diagnostics(records: &[RawOrderRecord]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let sample = &records[..records.len().min(DIAGNOSTIC_SAMPLE)];
    let stages: BTreeSet<String> = sample
        .iter()
        .map(|r| fields::text(r, &fields::STAGE))
        .filter(|s| !s.is_empty())
        .collect();
    let branches: BTreeSet<String> = sample
        .iter()
        .map(|r| {
            format!(
                "{} ({})",
                fields::text(r, &fields::DISTRIBUTION_BRANCH),
                fields::text(r, &fields::DISTRIBUTION_BRANCH_ID)
            )
        })
        .collect();
    debug!(?stages, ?branches, sampled = sample.len(), "fetched record overview");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
