//! HTTP client for the repository's search and usage-report endpoints.

use std::future::Future;
use std::time::Duration;

use pubstats_core::error::{Result, StatsError};
use pubstats_core::models::Publication;
use pubstats_core::settings::Settings;
use pubstats_data::publications::parse_search_response;
use pubstats_data::report::UsageReport;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Request timeout applied to every call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── StatsSource ───────────────────────────────────────────────────────────────

/// Where publications and their usage reports come from.
pub trait StatsSource {
    /// The group's publication catalogue, at most `max_items` entries.
    fn fetch_publications(&self, max_items: u32) -> impl Future<Output = Result<Vec<Publication>>>;

    /// The usage report of one publication.
    fn fetch_usage_report(&self, uuid: &str) -> impl Future<Output = Result<UsageReport>>;
}

// ── ClientConfig ──────────────────────────────────────────────────────────────

/// Everything the client needs to reach the repository.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub group_id: String,
    pub search_url: String,
    pub stats_url: String,
    pub entity_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Take the endpoint settings and credentials from parsed CLI settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StatsError::Config("an API key is required (--api-key or RC_API_KEY)".to_string())
            })?;

        Ok(Self {
            api_key,
            group_id: settings.group_id.clone(),
            search_url: settings.search_url.clone(),
            stats_url: settings.stats_url.clone(),
            entity_url: settings.entity_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("group_id", &self.group_id)
            .field("search_url", &self.search_url)
            .field("stats_url", &self.stats_url)
            .field("entity_url", &self.entity_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ── RepositoryClient ──────────────────────────────────────────────────────────

/// `reqwest`-backed [`StatsSource`].
pub struct RepositoryClient {
    client: Client,
    config: ClientConfig,
}

impl RepositoryClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, config })
    }

    /// Entity URI identifying `uuid` to the usage-report endpoint.
    pub fn entity_uri(&self, uuid: &str) -> String {
        format!("{}/{}", self.config.entity_url, uuid)
    }

    /// GET `url` with `params` and decode the body as JSON.
    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            StatsError::InvalidResponse(format!("body is not JSON: {}", e.without_url()))
        })
    }
}

impl StatsSource for RepositoryClient {
    async fn fetch_publications(&self, max_items: u32) -> Result<Vec<Publication>> {
        debug!(group = %self.config.group_id, max_items, "Fetching publication catalogue");
        let params = [
            ("query", format!("leitzahlCode:{}", self.config.group_id)),
            ("size", max_items.to_string()),
            ("apikey", self.config.api_key.clone()),
        ];
        let body = self.get_json(&self.config.search_url, &params).await?;
        parse_search_response(&body)
    }

    async fn fetch_usage_report(&self, uuid: &str) -> Result<UsageReport> {
        let params = [
            ("uri", self.entity_uri(uuid)),
            ("apikey", self.config.api_key.clone()),
        ];
        match self.get_json(&self.config.stats_url, &params).await {
            Ok(body) => Ok(UsageReport::from_value(&body)),
            // An unreadable body is a malformed report, not a failed request.
            Err(StatsError::InvalidResponse(reason)) => {
                warn!(uuid = %uuid, "Usage report unreadable: {}", reason);
                Ok(UsageReport::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// Transport failures never carry the request URL, which holds the API key.
fn transport_error(e: reqwest::Error) -> StatsError {
    StatsError::Http(e.without_url().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
