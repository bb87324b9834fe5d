//! End-to-end engine scenarios on mocked providers
//!
//! Exercises the full pipeline (cascade → normalize → score →
//! aggregate) without any network: scripted inspectors, performance
//! analyzers, and metric sources.

use beacon_engine::analyzer::{Analyzer, CompetitorGroup};
use beacon_engine::error::EngineError;
use beacon_engine::ratelimit::AdmissionControl;
use beacon_engine::types::{
    BacklinkMetrics, HeadingCounts, HintFile, KeywordMetrics, MetricSource, PageFacts,
    PageInspector, PerfFacts, PerformanceAnalyzer, ProviderError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

// ============================================================================
// Test doubles
// ============================================================================

/// Inspector returning fixed facts for every URL
struct StaticInspector {
    facts: PageFacts,
    /// Extra latency for URLs containing "slow"
    slow_delay: Option<Duration>,
}

impl StaticInspector {
    fn new(facts: PageFacts) -> Self {
        Self {
            facts,
            slow_delay: None,
        }
    }
}

#[async_trait::async_trait]
impl PageInspector for StaticInspector {
    async fn inspect(&self, url: &Url) -> Result<PageFacts, ProviderError> {
        if let Some(delay) = self.slow_delay {
            if url.as_str().contains("slow") {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(PageFacts {
            url: url.to_string(),
            ..self.facts.clone()
        })
    }
}

struct FailingInspector;

#[async_trait::async_trait]
impl PageInspector for FailingInspector {
    async fn inspect(&self, _url: &Url) -> Result<PageFacts, ProviderError> {
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

/// Performance analyzer returning fixed facts, or unconfigured
struct StaticPerf(Option<PerfFacts>);

#[async_trait::async_trait]
impl PerformanceAnalyzer for StaticPerf {
    fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    async fn analyze(&self, _url: &Url) -> Result<PerfFacts, ProviderError> {
        match &self.0 {
            Some(facts) => Ok(facts.clone()),
            None => Err(ProviderError::NotConfigured),
        }
    }
}

/// Scripted metric source usable for either family
struct Scripted<T: Clone> {
    name: &'static str,
    configured: bool,
    response: Result<T, &'static str>,
}

#[async_trait::async_trait]
impl<T: Clone + Send + Sync> MetricSource<T> for Scripted<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch(&self, _domain: &str) -> Result<T, ProviderError> {
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(msg) => Err(ProviderError::Api(msg.to_string())),
        }
    }
}

struct RejectAll;

impl AdmissionControl for RejectAll {
    fn try_admit(&self, _caller: &str) -> bool {
        false
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Scenario A page: no schema markup, one H1, SSL present
fn scenario_a_facts() -> PageFacts {
    PageFacts {
        https: true,
        word_count: 650,
        headings: HeadingCounts {
            h1: 1,
            h2: 3,
            ..Default::default()
        },
        leading_text: (0..30).map(|_| "word").collect::<Vec<_>>().join(" "),
        sentiment_hint: 0.5,
        broken_links: Some(0),
        llms_txt: HintFile::Missing,
        sitemap: HintFile::Valid,
        ..Default::default()
    }
}

fn good_perf() -> PerfFacts {
    PerfFacts {
        lcp_ms: 1800.0,
        inp_ms: 150.0,
        cls: 0.05,
        mobile_score: 92.0,
        ..Default::default()
    }
}

fn bare_analyzer(facts: PageFacts, perf: Option<PerfFacts>) -> Analyzer {
    Analyzer::new(
        Arc::new(StaticInspector::new(facts)),
        Arc::new(StaticPerf(perf)),
    )
}

fn keywords(total: u64, avg: f64) -> KeywordMetrics {
    KeywordMetrics {
        total_keywords: total,
        avg_position: avg,
        intent_match_pct: 50.0,
        ..Default::default()
    }
}

// ============================================================================
// Scenario A: degraded providers, healthy page
// ============================================================================

#[tokio::test]
async fn scenario_a_no_providers_still_scores() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()));
    let analysis = analyzer.analyze_url("example.com").await.unwrap();

    // Both families fall back to estimates.
    assert_eq!(analysis.metrics.source.keywords, "estimate");
    assert_eq!(analysis.metrics.source.backlinks, "estimate");
    assert!(analysis.metrics.errors.is_empty(), "nothing configured, nothing failed");

    let score = &analysis.score;
    assert!(!score.data_source.moz);
    assert!(!score.data_source.dataforseo);
    assert!(!score.data_source.gsc);
    assert!(score.data_source.pagespeed);

    // Content Structure partial: the schema metric is at zero.
    let structured = score.breakdown.content_structure.get("structured_data").unwrap();
    assert_eq!(structured.score, 0.0);
    assert!(score.content_structure > 0.0);

    // Website Technical high: SSL binary plus all vitals pass.
    assert_eq!(
        score.breakdown.website_technical.get("ssl").unwrap().score,
        2.0
    );
    assert_eq!(
        score
            .breakdown
            .website_technical
            .get("core_web_vitals")
            .unwrap()
            .score,
        6.0
    );
    assert!(score.website_technical >= 14.0);

    assert!(score.total > 0.0 && score.total < 100.0);

    // Estimate-backed pillars are called out to the caller.
    assert!(analysis
        .warnings
        .iter()
        .any(|w| w.contains("Keyword Visibility")));
    assert!(analysis.warnings.iter().any(|w| w.contains("AI Trust")));
}

#[tokio::test]
async fn scenario_a_missing_perf_degrades_technical_only() {
    let analyzer = bare_analyzer(scenario_a_facts(), None);
    let analysis = analyzer.analyze_url("example.com").await.unwrap();

    assert!(!analysis.score.data_source.pagespeed);
    assert_eq!(
        analysis
            .score
            .breakdown
            .website_technical
            .get("core_web_vitals")
            .unwrap()
            .score,
        0.0
    );
    assert!(analysis
        .warnings
        .iter()
        .any(|w| w.contains("Website Technical")));
}

// ============================================================================
// Cascade semantics end to end
// ============================================================================

#[tokio::test]
async fn cascade_priority_lower_provider_wins_after_failure() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()))
        .with_keyword_provider(Arc::new(Scripted {
            name: "DataForSEO",
            configured: true,
            response: Err("quota exceeded"),
        }))
        .with_keyword_provider(Arc::new(Scripted {
            name: "Search Console",
            configured: true,
            response: Ok(keywords(150, 8.0)),
        }));

    let analysis = analyzer.analyze_url("example.com").await.unwrap();
    assert_eq!(analysis.metrics.source.keywords, "Search Console");
    assert_eq!(analysis.metrics.errors.len(), 1);
    assert!(analysis.metrics.errors[0].starts_with("DataForSEO keywords:"));
    assert!(analysis.score.data_source.gsc);
    assert!(!analysis.score.data_source.dataforseo);

    // The warning names the affected pillars, not just the provider.
    assert!(analysis
        .warnings
        .iter()
        .any(|w| w.contains("Keyword Visibility") && w.contains("quota exceeded")));
}

#[tokio::test]
async fn cascade_unconfigured_providers_skip_without_errors() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()))
        .with_backlink_provider(Arc::new(Scripted::<BacklinkMetrics> {
            name: "Moz",
            configured: false,
            response: Err("unreachable"),
        }))
        .with_backlink_provider(Arc::new(Scripted {
            name: "DataForSEO",
            configured: true,
            response: Ok(BacklinkMetrics {
                domain_rating: 55.0,
                total_backlinks: 4000,
                referring_domains: 120,
            }),
        }));

    let analysis = analyzer.analyze_url("example.com").await.unwrap();
    assert_eq!(analysis.metrics.source.backlinks, "DataForSEO");
    assert!(analysis.metrics.errors.is_empty());
    assert!(analysis.score.data_source.dataforseo);
    assert!(!analysis.score.data_source.moz);
}

// ============================================================================
// Determinism
// ============================================================================

#[tokio::test]
async fn identical_inputs_give_byte_identical_results() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()))
        .with_keyword_provider(Arc::new(Scripted {
            name: "DataForSEO",
            configured: true,
            response: Ok(keywords(320, 5.5)),
        }));

    let first = analyzer.analyze_url("example.com").await.unwrap();
    let second = analyzer.analyze_url("example.com").await.unwrap();

    assert_eq!(
        serde_json::to_string(&first.score).unwrap(),
        serde_json::to_string(&second.score).unwrap()
    );
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.warnings, second.warnings);
}

// ============================================================================
// Batch semantics
// ============================================================================

#[tokio::test]
async fn batch_preserves_input_order_despite_uneven_latency() {
    let inspector = StaticInspector {
        facts: scenario_a_facts(),
        slow_delay: Some(Duration::from_millis(80)),
    };
    let analyzer = Analyzer::new(Arc::new(inspector), Arc::new(StaticPerf(None)));

    let urls = vec![
        "slow-first.example.com".to_string(),
        "second.example.com".to_string(),
        "slow-third.example.com".to_string(),
        "fourth.example.com".to_string(),
    ];
    let batch = analyzer
        .analyze_batch("tester", &urls, &[], CancellationToken::new())
        .await
        .unwrap();

    let analyzed: Vec<&str> = batch.primary.urls.iter().map(String::as_str).collect();
    assert_eq!(
        analyzed,
        vec![
            "https://slow-first.example.com/",
            "https://second.example.com/",
            "https://slow-third.example.com/",
            "https://fourth.example.com/",
        ]
    );
}

#[tokio::test]
async fn batch_drops_malformed_urls_and_continues() {
    let analyzer = bare_analyzer(scenario_a_facts(), None);
    let urls = vec![
        "example.com".to_string(),
        "ftp://bad.example.com".to_string(),
        "example.com/pricing".to_string(),
    ];
    let batch = analyzer
        .analyze_batch("tester", &urls, &[], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(batch.primary.pages.len(), 2);
    assert!(batch
        .primary
        .warnings
        .iter()
        .any(|w| w.contains("ftp://bad.example.com") && w.contains("dropped")));
}

#[tokio::test]
async fn batch_of_identical_pages_averages_to_page_score() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()));
    let urls = vec![
        "example.com/a".to_string(),
        "example.com/b".to_string(),
        "example.com/c".to_string(),
    ];
    let batch = analyzer
        .analyze_batch("tester", &urls, &[], CancellationToken::new())
        .await
        .unwrap();

    let page_total = batch.primary.pages[0].score.total;
    assert_eq!(batch.primary.average.total, page_total);
    assert_eq!(batch.primary.name, "example.com");
    assert!(!batch.primary.recommendations.is_empty());
}

#[tokio::test]
async fn batch_with_competitors_produces_comparison() {
    let analyzer = bare_analyzer(scenario_a_facts(), Some(good_perf()));
    let groups = vec![CompetitorGroup {
        name: "rival".to_string(),
        urls: vec!["rival.example.net".to_string()],
    }];
    let batch = analyzer
        .analyze_batch(
            "tester",
            &["example.com".to_string()],
            &groups,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(batch.competitors.len(), 1);
    let comparison = batch.comparison.unwrap();
    assert_eq!(comparison.totals.len(), 2);
    assert_eq!(comparison.pillars.len(), 5);
    // Identical sites: deterministic tie handling, primary rank well-defined.
    assert!(comparison.primary_rank >= 1 && comparison.primary_rank <= 2);
}

#[tokio::test]
async fn batch_fails_only_when_nothing_is_analyzable() {
    let analyzer = Analyzer::new(Arc::new(FailingInspector), Arc::new(StaticPerf(None)));
    let result = analyzer
        .analyze_batch(
            "tester",
            &["example.com".to_string(), "example.org".to_string()],
            &[],
            CancellationToken::new(),
        )
        .await;
    assert!(matches!(result, Err(EngineError::Exhausted(_))));
}

#[tokio::test]
async fn failed_competitor_group_does_not_fail_the_batch() {
    let analyzer = bare_analyzer(scenario_a_facts(), None);
    let groups = vec![CompetitorGroup {
        name: "ghost".to_string(),
        urls: vec!["ftp://nowhere".to_string()],
    }];
    let batch = analyzer
        .analyze_batch(
            "tester",
            &["example.com".to_string()],
            &groups,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(batch.competitors.is_empty());
    assert!(batch.comparison.is_none());
    assert!(batch
        .primary
        .warnings
        .iter()
        .any(|w| w.contains("ghost") && w.contains("skipped")));
}

#[tokio::test]
async fn cancelled_batch_returns_no_partial_results() {
    let analyzer = bare_analyzer(scenario_a_facts(), None);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = analyzer
        .analyze_batch("tester", &["example.com".to_string()], &[], cancel)
        .await;
    assert!(matches!(result, Err(EngineError::Cancelled)));
}

#[tokio::test]
async fn rejected_caller_is_rate_limited() {
    let analyzer =
        bare_analyzer(scenario_a_facts(), None).with_admission(Arc::new(RejectAll));
    let result = analyzer
        .analyze_batch(
            "tester",
            &["example.com".to_string()],
            &[],
            CancellationToken::new(),
        )
        .await;
    assert!(matches!(result, Err(EngineError::RateLimited(_))));
}

#[tokio::test]
async fn failing_inspection_fails_only_that_url() {
    let analyzer = bare_analyzer(scenario_a_facts(), None);
    let result = analyzer.analyze_url("ht!tp://not a url").await;
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));

    let analyzer = Analyzer::new(Arc::new(FailingInspector), Arc::new(StaticPerf(None)));
    let result = analyzer.analyze_url("example.com").await;
    assert!(matches!(result, Err(EngineError::PageInspection { .. })));
}
