//! Google Search Console client
//!
//! Queries the Search Analytics API for the queries a verified property
//! ranks for. Free and authoritative when the operator has verified the
//! property, so it backs up DataForSEO in the keyword cascade.
//!
//! # API Reference
//! - Endpoint: https://www.googleapis.com/webmasters/v3/sites/{property}/searchAnalytics/query
//! - Auth: OAuth bearer token (obtained out of band; token refresh is the
//!   operator's concern, an expired token surfaces as an API error)

use crate::normalize;
use crate::types::{KeywordMetrics, MetricSource, ProviderError};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Search Console API base URL
const GSC_API_URL: &str = "https://www.googleapis.com/webmasters/v3/sites";

/// Default timeout for Search Console requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Query rows requested per property
const ROW_LIMIT: u32 = 500;

/// Reporting window in days
const WINDOW_DAYS: i64 = 28;

#[derive(Debug, Clone)]
struct GscCredentials {
    access_token: String,
    /// Verified property, e.g. "sc-domain:example.com" or "https://example.com/"
    property: String,
}

/// Google Search Console client
pub struct GscClient {
    http_client: Client,
    credentials: Option<GscCredentials>,
}

impl GscClient {
    /// Create a new Search Console client; both a token and a property
    /// are required for the client to be configured
    pub fn new(access_token: Option<String>, property: Option<String>) -> Self {
        let credentials = match (access_token, property) {
            (Some(access_token), Some(property)) => Some(GscCredentials {
                access_token,
                property,
            }),
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

    /// Query search analytics rows grouped by query string
    async fn query_search_analytics(
        &self,
    ) -> Result<SearchAnalyticsResponse, ProviderError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;

        // The property id contains ':' and '/' and must be one encoded
        // path segment.
        let mut url = Url::parse(GSC_API_URL)
            .map_err(|e| ProviderError::Parse(format!("GSC base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Parse("GSC base URL cannot be a base".to_string()))?
            .push(&creds.property)
            .push("searchAnalytics")
            .push("query");

        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(WINDOW_DAYS);

        debug!(property = %creds.property, %start, %end, "querying Search Console");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&creds.access_token)
            .json(&json!({
                "startDate": start.format("%Y-%m-%d").to_string(),
                "endDate": end.format("%Y-%m-%d").to_string(),
                "dimensions": ["query"],
                "rowLimit": ROW_LIMIT,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("GSC request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!(
                "GSC returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("GSC response: {}", e)))
    }
}

#[async_trait::async_trait]
impl MetricSource<KeywordMetrics> for GscClient {
    fn name(&self) -> &'static str {
        "Search Console"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch(&self, domain: &str) -> Result<KeywordMetrics, ProviderError> {
        let raw = self.query_search_analytics().await?;
        let metrics = normalize::keywords_from_gsc(&raw, domain);
        debug!(
            domain = %domain,
            total_keywords = metrics.total_keywords,
            "Search Console keyword metrics fetched"
        );
        Ok(metrics)
    }
}

// ============================================================================
// Search Console API Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<SearchAnalyticsRow>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchAnalyticsRow {
    /// Dimension values; with `dimensions: ["query"]` this is the query
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub position: f64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let client = GscClient::new(None, None);
        assert_eq!(client.name(), "Search Console");
    }

    #[test]
    fn test_unconfigured_without_token_and_property() {
        assert!(!GscClient::new(None, None).is_configured());
        assert!(!GscClient::new(Some("token".into()), None).is_configured());
        assert!(!GscClient::new(None, Some("sc-domain:example.com".into())).is_configured());
        assert!(
            GscClient::new(Some("token".into()), Some("sc-domain:example.com".into()))
                .is_configured()
        );
    }

    #[tokio::test]
    async fn test_fetch_unconfigured_is_not_configured_error() {
        let client = GscClient::new(None, None);
        let result = client.fetch("example.com").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured)));
    }

    #[test]
    fn test_rows_parse_with_defaults() {
        let body = r#"{"rows": [
            {"keys": ["how to clean widgets"], "clicks": 12.0, "impressions": 340.0, "position": 7.2},
            {"keys": ["acme widgets"]}
        ]}"#;
        let parsed: SearchAnalyticsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].keys[0], "how to clean widgets");
        assert_eq!(parsed.rows[1].clicks, 0.0);
        assert_eq!(parsed.rows[1].position, 0.0);
    }

    #[test]
    fn test_property_is_encoded_as_single_segment() {
        let mut url = Url::parse(GSC_API_URL).unwrap();
        url.path_segments_mut()
            .unwrap()
            .push("sc-domain:example.com")
            .push("searchAnalytics")
            .push("query");
        assert!(url.as_str().contains("sc-domain%3Aexample.com"));
    }
}
