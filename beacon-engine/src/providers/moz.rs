//! Moz Links API client
//!
//! Queries the Moz Links API (v2) for domain-level backlink metrics:
//! domain authority, total external links, referring root domains.
//! Highest-fidelity backlink source, tried first by the cascade.
//!
//! # API Reference
//! - Endpoint: https://lsapi.seomoz.com/v2/url_metrics
//! - Auth: HTTP Basic with access id + secret key

use crate::normalize;
use crate::types::{BacklinkMetrics, MetricSource, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Moz Links API endpoint
const MOZ_API_URL: &str = "https://lsapi.seomoz.com/v2/url_metrics";

/// Default timeout for Moz API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
struct MozCredentials {
    access_id: String,
    secret_key: String,
}

/// Moz Links API client
///
/// Configured when both an access id and a secret key are present.
pub struct MozClient {
    http_client: Client,
    credentials: Option<MozCredentials>,
}

impl MozClient {
    /// Create a new Moz client; either credential missing leaves the
    /// client unconfigured
    pub fn new(access_id: Option<String>, secret_key: Option<String>) -> Self {
        let credentials = match (access_id, secret_key) {
            (Some(access_id), Some(secret_key)) => Some(MozCredentials {
                access_id,
                secret_key,
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

    /// Query URL metrics for a domain
    async fn query_url_metrics(&self, domain: &str) -> Result<MozUrlMetrics, ProviderError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;

        debug!(domain = %domain, "querying Moz url_metrics");

        let response = self
            .http_client
            .post(MOZ_API_URL)
            .basic_auth(&creds.access_id, Some(&creds.secret_key))
            .json(&json!({ "targets": [domain] }))
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Moz request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!(
                "Moz returned {}: {}",
                status, body
            )));
        }

        let parsed: MozResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Moz response: {}", e)))?;

        parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("Moz response had no results".to_string()))
    }
}

#[async_trait::async_trait]
impl MetricSource<BacklinkMetrics> for MozClient {
    fn name(&self) -> &'static str {
        "Moz"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch(&self, domain: &str) -> Result<BacklinkMetrics, ProviderError> {
        let raw = self.query_url_metrics(domain).await?;
        let metrics = normalize::backlinks_from_moz(&raw);
        debug!(
            domain = %domain,
            domain_authority = metrics.domain_rating,
            referring_domains = metrics.referring_domains,
            "Moz backlink metrics fetched"
        );
        Ok(metrics)
    }
}

// ============================================================================
// Moz API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct MozResponse {
    #[serde(default)]
    results: Vec<MozUrlMetrics>,
}

/// One row of the Moz `url_metrics` response; unreported fields
/// null-coalesce to zero
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MozUrlMetrics {
    #[serde(default)]
    pub domain_authority: f64,
    #[serde(default)]
    pub external_links_to_root_domain: u64,
    #[serde(default)]
    pub root_domains_to_root_domain: u64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name() {
        let client = MozClient::new(None, None);
        assert_eq!(client.name(), "Moz");
    }

    #[test]
    fn test_unconfigured_without_both_credentials() {
        assert!(!MozClient::new(None, None).is_configured());
        assert!(!MozClient::new(Some("id".into()), None).is_configured());
        assert!(!MozClient::new(None, Some("key".into())).is_configured());
        assert!(MozClient::new(Some("id".into()), Some("key".into())).is_configured());
    }

    #[tokio::test]
    async fn test_fetch_unconfigured_is_not_configured_error() {
        let client = MozClient::new(None, None);
        let result =
            MetricSource::<BacklinkMetrics>::fetch(&client, "example.com").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured)));
    }

    #[test]
    fn test_response_parse_with_missing_fields() {
        let parsed: MozResponse =
            serde_json::from_str(r#"{"results": [{"domain_authority": 42.0}]}"#).unwrap();
        let row = &parsed.results[0];
        assert_eq!(row.domain_authority, 42.0);
        assert_eq!(row.external_links_to_root_domain, 0);
        assert_eq!(row.root_domains_to_root_domain, 0);
    }
}
