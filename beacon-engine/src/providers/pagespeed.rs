//! PageSpeed Insights client
//!
//! Fetches field Core Web Vitals (LCP, INP, CLS) and the Lighthouse
//! mobile performance score for a URL. Works without an API key at a
//! reduced quota, so the client always reports itself configured; a key
//! only raises the request ceiling.
//!
//! # API Reference
//! - Endpoint: https://www.googleapis.com/pagespeedonline/v5/runPagespeed
//! - Field data: `loadingExperience.metrics` percentiles + categories
//! - Lab data: `lighthouseResult.categories.performance.score`

use crate::normalize;
use crate::types::{PerfFacts, PerformanceAnalyzer, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// PageSpeed Insights API endpoint
const PAGESPEED_API_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// PageSpeed runs a full Lighthouse audit; allow it time
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// PageSpeed Insights client
pub struct PageSpeedClient {
    http_client: Client,
    api_key: Option<String>,
}

impl PageSpeedClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl PerformanceAnalyzer for PageSpeedClient {
    /// Keyless operation is supported; the API key only raises quota
    fn is_configured(&self) -> bool {
        true
    }

    async fn analyze(&self, url: &Url) -> Result<PerfFacts, ProviderError> {
        debug!(url = %url, "running PageSpeed analysis");

        let mut request = self
            .http_client
            .get(PAGESPEED_API_URL)
            .query(&[("url", url.as_str()), ("strategy", "MOBILE")]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("PageSpeed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!(
                "PageSpeed returned {}: {}",
                status, body
            )));
        }

        let parsed: PageSpeedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("PageSpeed response: {}", e)))?;

        let facts = normalize::perf_from_pagespeed(&parsed);
        debug!(
            url = %url,
            lcp_ms = facts.lcp_ms,
            inp_ms = facts.inp_ms,
            cls = facts.cls,
            mobile_score = facts.mobile_score,
            "PageSpeed analysis complete"
        );
        Ok(facts)
    }
}

// ============================================================================
// PageSpeed API Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageSpeedResponse {
    #[serde(rename = "loadingExperience")]
    pub loading_experience: Option<LoadingExperience>,
    #[serde(rename = "lighthouseResult")]
    pub lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoadingExperience {
    #[serde(default)]
    pub metrics: HashMap<String, MetricPercentile>,
    #[serde(rename = "overall_category")]
    pub overall_category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetricPercentile {
    #[serde(default)]
    pub percentile: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LighthouseResult {
    pub categories: Option<LighthouseCategories>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LighthouseCategories {
    pub performance: Option<CategoryScore>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryScore {
    /// Lighthouse category score, 0.0-1.0
    pub score: Option<f64>,
}

// ============================================================================
// Tests
// ============================================================================
