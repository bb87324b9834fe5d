//! DataForSEO API client
//!
//! Covers both metric families:
//! - ranked keywords via DataForSEO Labs (`ranked_keywords/live`)
//! - backlink summary via the Backlinks API (`backlinks/summary/live`)
//!
//! Paid, high-coverage source: first in the keyword cascade, second in
//! the backlink cascade (behind Moz).
//!
//! # API Reference
//! - Endpoint: https://api.dataforseo.com/v3
//! - Auth: HTTP Basic with account login + password
//! - Envelope: requests and responses are arrays of tasks; the payload
//!   of interest is `tasks[0].result[0]`

use crate::normalize;
use crate::types::{BacklinkMetrics, KeywordMetrics, MetricSource, ProviderError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// DataForSEO API base URL
const DATAFORSEO_API_URL: &str = "https://api.dataforseo.com/v3";

/// Default timeout for DataForSEO requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Keyword rows requested per domain
const RANKED_KEYWORDS_LIMIT: u32 = 500;

/// Task status code DataForSEO uses for success
const TASK_OK: u32 = 20000;

#[derive(Debug, Clone)]
struct DataForSeoCredentials {
    login: String,
    password: String,
}

/// DataForSEO API client
pub struct DataForSeoClient {
    http_client: Client,
    credentials: Option<DataForSeoCredentials>,
}

impl DataForSeoClient {
    /// Create a new DataForSEO client; either credential missing leaves
    /// the client unconfigured
    pub fn new(login: Option<String>, password: Option<String>) -> Self {
        let credentials = match (login, password) {
            (Some(login), Some(password)) => Some(DataForSeoCredentials { login, password }),
            _ => None,
        };

        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            credentials,
        }
    }

    /// POST a single task and unwrap `tasks[0].result[0]`
    async fn post_task<T: DeserializeOwned>(
        &self,
        path: &str,
        task: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;

        let url = format!("{}/{}", DATAFORSEO_API_URL, path);
        debug!(path = %path, "posting DataForSEO task");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&creds.login, Some(&creds.password))
            .json(&json!([task]))
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("DataForSEO request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!(
                "DataForSEO returned {}: {}",
                status, body
            )));
        }

        let envelope: DataForSeoResponse<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("DataForSEO response: {}", e)))?;

        let task = envelope
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("DataForSEO response had no tasks".to_string()))?;

        if task.status_code != TASK_OK {
            return Err(ProviderError::Api(format!(
                "DataForSEO task failed ({}): {}",
                task.status_code, task.status_message
            )));
        }

        task.result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("DataForSEO task had no result".to_string()))
    }
}

#[async_trait::async_trait]
impl MetricSource<KeywordMetrics> for DataForSeoClient {
    fn name(&self) -> &'static str {
        "DataForSEO"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch(&self, domain: &str) -> Result<KeywordMetrics, ProviderError> {
        let raw: RankedKeywordsResult = self
            .post_task(
                "dataforseo_labs/google/ranked_keywords/live",
                json!({ "target": domain, "limit": RANKED_KEYWORDS_LIMIT }),
            )
            .await?;

        let metrics = normalize::keywords_from_dataforseo(&raw, domain);
        debug!(
            domain = %domain,
            total_keywords = metrics.total_keywords,
            avg_position = metrics.avg_position,
            "DataForSEO keyword metrics fetched"
        );
        Ok(metrics)
    }
}

#[async_trait::async_trait]
impl MetricSource<BacklinkMetrics> for DataForSeoClient {
    fn name(&self) -> &'static str {
        "DataForSEO"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch(&self, domain: &str) -> Result<BacklinkMetrics, ProviderError> {
        let raw: BacklinksSummaryResult = self
            .post_task(
                "backlinks/summary/live",
                json!({ "target": domain, "include_subdomains": true }),
            )
            .await?;

        let metrics = normalize::backlinks_from_dataforseo(&raw);
        debug!(
            domain = %domain,
            domain_rating = metrics.domain_rating,
            referring_domains = metrics.referring_domains,
            "DataForSEO backlink metrics fetched"
        );
        Ok(metrics)
    }
}

// ============================================================================
// DataForSEO API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct DataForSeoResponse<T> {
    #[serde(default = "Vec::new")]
    tasks: Vec<DataForSeoTask<T>>,
}

#[derive(Debug, Deserialize)]
struct DataForSeoTask<T> {
    #[serde(default)]
    status_code: u32,
    #[serde(default)]
    status_message: String,
    #[serde(default = "Vec::new")]
    result: Vec<T>,
}

/// `ranked_keywords/live` result payload
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankedKeywordsResult {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RankedKeywordItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankedKeywordItem {
    pub keyword_data: Option<KeywordData>,
    pub ranked_serp_element: Option<RankedSerpElement>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordData {
    #[serde(default)]
    pub keyword: String,
    pub search_intent_info: Option<SearchIntentInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchIntentInfo {
    pub main_intent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankedSerpElement {
    pub serp_item: Option<SerpItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SerpItem {
    pub rank_absolute: Option<u32>,
    /// Estimated traffic value for this keyword
    pub etv: Option<f64>,
}

/// `backlinks/summary/live` result payload
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BacklinksSummaryResult {
    /// Domain rank on DataForSEO's 0-1000 scale
    #[serde(default)]
    pub rank: f64,
    #[serde(default)]
    pub backlinks: u64,
    #[serde(default)]
    pub referring_domains: u64,
}

// ============================================================================
// Tests
// ============================================================================
