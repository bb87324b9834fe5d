//! Cascade Orchestrator
//!
//! Runs one metric family's provider list in fixed priority order:
//! unconfigured providers are skipped silently, the first configured
//! provider to succeed wins, and every failure is recorded without
//! stopping the cascade. An exhausted cascade returns an empty outcome;
//! the caller substitutes a heuristic estimate. Never fatal.
//!
//! The two families (keywords, backlinks) cascade independently and may
//! run concurrently; within one family the steps are sequential so a
//! lower-priority provider is never charged latency or cost when a
//! higher-priority one already answered.

use crate::types::{MetricFamily, MetricSource, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One provider failure, kept structured so warnings can be mapped to
/// affected pillars without parsing error strings
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub family: MetricFamily,
    pub message: String,
}

impl ProviderFailure {
    /// Render in the `"{Provider} {family}: {message}"` shape recorded
    /// in `UnifiedSeoMetrics.errors`
    pub fn to_error_string(&self) -> String {
        format!("{} {}: {}", self.provider, self.family, self.message)
    }
}

/// Result of cascading one metric family
#[derive(Debug)]
pub struct CascadeOutcome<T> {
    /// First successful provider's normalized metrics; None when exhausted
    pub value: Option<T>,
    /// Winning provider name; None when exhausted
    pub source: Option<&'static str>,
    /// Failures from configured providers that were tried and lost
    pub failures: Vec<ProviderFailure>,
}

impl<T> CascadeOutcome<T> {
    /// True when at least one configured provider was tried but the
    /// winner came from further down the list (or nowhere)
    pub fn fell_back(&self) -> bool {
        !self.failures.is_empty() || self.source.is_none()
    }
}

/// Try providers in priority order until one succeeds
///
/// Each step is bounded by `step_timeout`; a timeout is treated exactly
/// like any other provider failure.
pub async fn run_cascade<T>(
    family: MetricFamily,
    providers: &[Arc<dyn MetricSource<T>>],
    domain: &str,
    step_timeout: Duration,
) -> CascadeOutcome<T> {
    let mut failures = Vec::new();

    for provider in providers {
        if !provider.is_configured() {
            debug!(
                provider = provider.name(),
                %family,
                "provider not configured, skipping"
            );
            continue;
        }

        let attempt = tokio::time::timeout(step_timeout, provider.fetch(domain)).await;
        match attempt {
            Ok(Ok(value)) => {
                debug!(provider = provider.name(), %family, "cascade resolved");
                return CascadeOutcome {
                    value: Some(value),
                    source: Some(provider.name()),
                    failures,
                };
            }
            Ok(Err(ProviderError::NotConfigured)) => {
                // Providers may also discover mid-flight that they lack
                // credentials; same treatment as the up-front check.
                debug!(
                    provider = provider.name(),
                    %family,
                    "provider reported not configured"
                );
            }
            Ok(Err(e)) => {
                warn!(provider = provider.name(), %family, "provider failed: {}", e);
                failures.push(ProviderFailure {
                    provider: provider.name(),
                    family,
                    message: e.to_string(),
                });
            }
            Err(_) => {
                let e = ProviderError::Timeout(step_timeout);
                warn!(provider = provider.name(), %family, "provider timed out");
                failures.push(ProviderFailure {
                    provider: provider.name(),
                    family,
                    message: e.to_string(),
                });
            }
        }
    }

    CascadeOutcome {
        value: None,
        source: None,
        failures,
    }
}

// ============================================================================
// Tests
// ============================================================================
