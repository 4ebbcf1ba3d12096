//! InfoPoint HTTP client.
//!
//! Provides the async source trait the run loop consumes plus the real
//! `reqwest`-backed implementation.

use async_trait::async_trait;

use crate::domain::StopId;

use super::error::FetchError;
use super::types::StopDeparturesPayload;

/// Default base URL for the InfoPoint REST API.
const DEFAULT_BASE_URL: &str = "http://bustracker.pvta.com/InfoPoint/rest";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A source of per-stop departure payloads.
///
/// The run loop is written against this trait so tests can substitute a
/// canned source for the live API.
#[async_trait]
pub trait DepartureSource {
    /// Fetch the raw departures payload for one stop.
    async fn stop_departures(
        &self,
        stop: &StopId,
    ) -> Result<Vec<StopDeparturesPayload>, FetchError>;
}

/// Configuration for the InfoPoint client.
#[derive(Debug, Clone)]
pub struct InfoPointConfig {
    /// Base URL for the API (defaults to the production InfoPoint host)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl InfoPointConfig {
    /// Create a config with the production defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for InfoPointConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// InfoPoint REST API client.
///
/// One GET per stop; no authentication, the API is public.
#[derive(Debug, Clone)]
pub struct InfoPointClient {
    http: reqwest::Client,
    base_url: String,
}

impl InfoPointClient {
    /// Create a new client with the given configuration.
    pub fn new(config: InfoPointConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl DepartureSource for InfoPointClient {
    async fn stop_departures(
        &self,
        stop: &StopId,
    ) -> Result<Vec<StopDeparturesPayload>, FetchError> {
        let url = format!("{}/stopdepartures/get/{}", self.base_url, stop.as_str());

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}
