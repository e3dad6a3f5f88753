//! Catalogue lookup client
//!
//! Queries the NLB catalogue service for the physical copies matching one
//! search key. The `CatalogueClient` trait is the seam the worker pool and
//! the tests depend on; `NlbClient` is the production implementation over
//! the `GetAvailabilityInfo` endpoint.
//!
//! # Requirements
//! - Requires an API key (`X-API-KEY` header)
//! - Requires network connectivity
//! - Keeps a polite fixed interval between requests; the service documents
//!   no rate limit, so outbound pressure is kept low here and by the small
//!   worker pool

use nlbcheck_common::models::AvailabilityItem;
use nlbcheck_common::Error;
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error as ThisError;
use tracing::debug;

/// Production catalogue base URL
pub const DEFAULT_BASE_URL: &str = "https://openweb.nlb.gov.sg/api/v1/Catalogue";

/// Per-call timeout for catalogue requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum interval between two requests from one client
const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(250);

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("nlbcheck/", env!("CARGO_PKG_VERSION"));

/// Lookup failure for a single search key
#[derive(Debug, ThisError)]
pub enum CatalogueError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Service returned a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse the service response
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogueError {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api(_))
    }
}

/// External catalogue lookup interface.
///
/// One operation: given a search key, return every matching physical copy
/// (possibly none). Implementations are shared by reference across worker
/// threads, hence the `Send + Sync` bound.
pub trait CatalogueClient: Send + Sync {
    /// Look up the copies matching `key`.
    ///
    /// An empty vector means the catalogue knows no copy for this key; an
    /// error means the lookup itself failed and the caller decides whether
    /// to retry or degrade.
    fn lookup(&self, key: &str) -> Result<Vec<AvailabilityItem>, CatalogueError>;
}

/// Catalogue client for the NLB availability service
pub struct NlbClient {
    /// HTTP client for API requests
    http_client: Client,
    base_url: String,
    /// Rate limiter (last request time)
    rate_limiter: Mutex<Option<Instant>>,
}

impl NlbClient {
    /// Create a new catalogue client.
    ///
    /// `base_url` overrides the production endpoint, e.g. for a staging
    /// service or a local stub.
    pub fn new(api_key: &str, base_url: Option<&str>) -> nlbcheck_common::Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut key_value = header::HeaderValue::from_str(api_key)
            .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            rate_limiter: Mutex::new(None),
        })
    }

    /// Sleep if necessary to keep the minimum interval between requests.
    fn enforce_rate_limit(&self) {
        let mut last_request = self
            .rate_limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < RATE_LIMIT_INTERVAL {
                let sleep_duration = RATE_LIMIT_INTERVAL - elapsed;
                debug!(
                    sleep_ms = sleep_duration.as_millis(),
                    "Rate limiting: sleeping before catalogue request"
                );
                std::thread::sleep(sleep_duration);
            }
        }

        *last_request = Some(Instant::now());
    }
}

impl CatalogueClient for NlbClient {
    fn lookup(&self, key: &str) -> Result<Vec<AvailabilityItem>, CatalogueError> {
        debug!(key = %key, "Querying catalogue availability");

        self.enforce_rate_limit();

        let url = format!("{}/GetAvailabilityInfo", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("ISBN", key)])
            .send()
            .map_err(|e| CatalogueError::Network(format!("Catalogue request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(CatalogueError::Api(format!(
                "Catalogue returned {}: {}",
                status, body
            )));
        }

        let payload: AvailabilityResponse = response
            .json()
            .map_err(|e| CatalogueError::Parse(format!("Failed to parse catalogue response: {}", e)))?;

        let items = payload.items.unwrap_or_default();
        debug!(
            key = %key,
            copies = items.len(),
            status = ?payload.status,
            message = ?payload.message,
            "Catalogue query complete"
        );
        Ok(items)
    }
}

// ============================================================================
// Catalogue API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AvailabilityResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Option<Vec<AvailabilityItem>>,
}

// ============================================================================
// Tests
// ============================================================================
