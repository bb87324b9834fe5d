//! Core Types and Trait Definitions for the Beacon engine
//!
//! Defines the contracts between the three layers of the analysis
//! pipeline:
//! - **Data acquisition:** `MetricSource`, `PageInspector`,
//!   `PerformanceAnalyzer` (one implementation per external provider)
//! - **Fusion:** canonical metric structs produced by the cascade,
//!   independent of which provider supplied them
//! - **Scoring:** consumes only canonical structs, never raw provider
//!   payloads

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Source name recorded when every provider for a metric family was
/// unavailable and a heuristic estimate was synthesized instead.
pub const ESTIMATE_SOURCE: &str = "estimate";

// ============================================================================
// Metric families
// ============================================================================

/// Metric family resolved by an independent provider cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    Keywords,
    Backlinks,
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricFamily::Keywords => write!(f, "keywords"),
            MetricFamily::Backlinks => write!(f, "backlinks"),
        }
    }
}

// ============================================================================
// Canonical metric structs (fusion output)
// ============================================================================

/// Ranked-keyword trend direction, when a provider reports one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordTrend {
    Rising,
    Stable,
    Declining,
    #[default]
    Unknown,
}

/// Canonical keyword metrics, independent of the producing provider
///
/// Every field null-coalesces to its zero value during normalization so
/// the scoring engine never sees a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    /// Number of keywords the domain ranks for
    pub total_keywords: u64,
    /// Mean SERP position across ranked keywords (0.0 when unknown)
    pub avg_position: f64,
    /// Estimated monthly organic traffic
    pub estimated_traffic: f64,
    /// Share of ranked keywords matching discovery intent, 0-100
    pub intent_match_pct: f64,
    /// Best SERP position of a brand-matching keyword
    pub brand_best_rank: Option<u32>,
    /// Trend direction, when reported
    pub trend: KeywordTrend,
}

/// Canonical backlink metrics, independent of the producing provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacklinkMetrics {
    /// Provider-reported domain rating/authority, normalized to 0-100
    pub domain_rating: f64,
    /// Total backlink count
    pub total_backlinks: u64,
    /// Distinct referring domains
    pub referring_domains: u64,
}

/// Which provider produced each metric family
///
/// Always a provider name or [`ESTIMATE_SOURCE`], never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSources {
    pub keywords: String,
    pub backlinks: String,
}

impl Default for MetricSources {
    fn default() -> Self {
        Self {
            keywords: ESTIMATE_SOURCE.to_string(),
            backlinks: ESTIMATE_SOURCE.to_string(),
        }
    }
}

/// Fused keyword + backlink metrics with source provenance
///
/// The cascade always returns a usable value for both families; quality
/// degrades (to estimates) rather than the scan failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSeoMetrics {
    pub keywords: KeywordMetrics,
    pub backlinks: BacklinkMetrics,
    pub source: MetricSources,
    /// Non-fatal provider errors collected while cascading
    pub errors: Vec<String>,
}

// ============================================================================
// Page inspection facts
// ============================================================================

/// Status of a site hint file (`llms.txt`, `sitemap.xml`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintFile {
    #[default]
    Missing,
    /// File exists but content did not look well-formed
    Present,
    /// File exists and content looks well-formed
    Valid,
}

/// Heading element counts by level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

impl HeadingCounts {
    pub fn level(&self, level: u8) -> u32 {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            4 => self.h4,
            5 => self.h5,
            6 => self.h6,
            _ => 0,
        }
    }

    /// True when a heading level is used while the level above it is absent
    /// (h1 → h2 → h3 order is broken)
    pub fn has_level_skip(&self) -> bool {
        (2..=6u8).any(|l| self.level(l) > 0 && self.level(l - 1) == 0)
    }
}

/// Structural facts extracted from a single page
///
/// Produced by a [`PageInspector`]; every field defaults to its zero value
/// so a partially-extracted page still scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFacts {
    pub url: String,
    /// Final URL was served over HTTPS
    pub https: bool,
    pub word_count: u32,
    pub headings: HeadingCounts,
    /// JSON-LD schema.org types present on the page
    pub schema_types: Vec<String>,
    pub images: u32,
    pub images_with_alt: u32,
    pub videos: u32,
    pub tables: u32,
    pub lists: u32,
    pub internal_links: u32,
    pub external_links: u32,
    /// Leading visible text, used by the direct-answer heuristic
    pub leading_text: String,
    /// Author/credential markup present (Person schema, author fields)
    pub has_author_schema: bool,
    /// Outbound citations to distinct external domains
    pub citation_count: u32,
    /// Local/GEO markup present (LocalBusiness schema, postal address)
    pub has_local_signals: bool,
    /// Lexicon-based content sentiment hint, 0.0-1.0 (0.5 = neutral)
    pub sentiment_hint: f64,
    /// Broken internal links found by sampling; None when not checked
    pub broken_links: Option<u32>,
    pub llms_txt: HintFile,
    pub sitemap: HintFile,
}

// ============================================================================
// Performance facts
// ============================================================================

/// Core Web Vitals assessment tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerfCategory {
    Good,
    NeedsImprovement,
    Poor,
    #[default]
    Unknown,
}

/// Core Web Vitals and mobile performance for a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfFacts {
    /// Largest Contentful Paint, milliseconds
    pub lcp_ms: f64,
    /// Interaction to Next Paint, milliseconds
    pub inp_ms: f64,
    /// Cumulative Layout Shift score
    pub cls: f64,
    /// Provider-reported overall tier
    pub category: PerfCategory,
    /// Mobile performance score, 0-100
    pub mobile_score: f64,
}

// ============================================================================
// Provider contracts
// ============================================================================

/// Provider adapter error
///
/// `NotConfigured` is the one variant the cascade skips silently; every
/// other variant is recorded as a non-fatal error and the cascade moves on
/// to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider has no credentials; the operator should be nudged, not warned
    #[error("not configured")]
    NotConfigured,

    /// Network communication error
    #[error("network error: {0}")]
    Network(String),

    /// Upstream returned an error or non-2xx status
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse the upstream payload
    #[error("parse error: {0}")]
    Parse(String),

    /// Upstream call exceeded its deadline
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A configured-or-not source of canonical metrics for one family
///
/// Implemented once per provider per family; a provider covering both
/// families (DataForSEO) implements the trait twice. Adapters normalize
/// internally; raw provider JSON never crosses this boundary.
#[async_trait::async_trait]
pub trait MetricSource<T>: Send + Sync {
    /// Provider name for provenance tracking
    fn name(&self) -> &'static str;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// Fetch and normalize metrics for a domain
    async fn fetch(&self, domain: &str) -> Result<T, ProviderError>;
}

/// Structural page inspection contract
#[async_trait::async_trait]
pub trait PageInspector: Send + Sync {
    async fn inspect(&self, url: &Url) -> Result<PageFacts, ProviderError>;
}

/// Core Web Vitals / performance analysis contract
#[async_trait::async_trait]
pub trait PerformanceAnalyzer: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn analyze(&self, url: &Url) -> Result<PerfFacts, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_sources_default_to_estimate() {
        let sources = MetricSources::default();
        assert_eq!(sources.keywords, ESTIMATE_SOURCE);
        assert_eq!(sources.backlinks, ESTIMATE_SOURCE);
    }

    #[test]
    fn test_heading_level_skip() {
        let mut h = HeadingCounts::default();
        assert!(!h.has_level_skip(), "empty page has no skip");

        h.h1 = 1;
        h.h2 = 3;
        assert!(!h.has_level_skip());

        h.h2 = 0;
        h.h3 = 2;
        assert!(h.has_level_skip(), "h3 without h2 is a skip");
    }

    #[test]
    fn test_heading_level_accessor() {
        let h = HeadingCounts {
            h1: 1,
            h4: 7,
            ..Default::default()
        };
        assert_eq!(h.level(1), 1);
        assert_eq!(h.level(4), 7);
        assert_eq!(h.level(9), 0);
    }

    #[test]
    fn test_metric_family_display() {
        assert_eq!(MetricFamily::Keywords.to_string(), "keywords");
        assert_eq!(MetricFamily::Backlinks.to_string(), "backlinks");
    }
}
