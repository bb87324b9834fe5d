//! Analyzer - per-URL and batch orchestration
//!
//! For one URL: page inspection, performance analysis, and the two
//! metric-family cascades fan out concurrently and are joined regardless
//! of individual failures; only page inspection is mandatory. For a
//! batch: one task per URL under a semaphore, cancellation via
//! `CancellationToken`, output order matching input order, malformed
//! URLs dropped with a warning. The batch fails only when zero URLs
//! could be analyzed.

use crate::aggregate::{average_scores, compare_scores, Comparison};
use crate::cascade::{run_cascade, ProviderFailure};
use crate::error::{EngineError, EngineResult};
use crate::estimate::{estimate_backlinks, estimate_keywords};
use crate::events::ScanEvent;
use crate::providers::{
    DataForSeoClient, GscClient, HttpPageInspector, MozClient, PageSpeedClient,
};
use crate::ratelimit::{AdmissionControl, Unlimited};
use crate::scoring::recommendations::{generate_recommendations, Recommendation};
use crate::scoring::{score_url, ScoreResult};
use crate::types::{
    BacklinkMetrics, KeywordMetrics, MetricFamily, MetricSource, MetricSources, PageInspector,
    PerformanceAnalyzer, ProviderError, UnifiedSeoMetrics, ESTIMATE_SOURCE,
};
use beacon_common::config::ProviderCredentials;
use beacon_common::urls::{domain_of, normalize_url};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Recommendations kept per domain result
const MAX_RECOMMENDATIONS: usize = 10;

/// Operational limits for the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerLimits {
    /// Concurrent URL analyses per batch
    pub max_concurrency: usize,
    /// Ceiling for one URL's page inspection
    pub inspection_timeout: Duration,
    /// Ceiling per cascade step
    pub provider_timeout: Duration,
    /// Ceiling for the performance branch (a full Lighthouse run)
    pub performance_timeout: Duration,
    pub max_primary_urls: usize,
    pub max_competitor_groups: usize,
    pub max_group_urls: usize,
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            inspection_timeout: Duration::from_secs(30),
            provider_timeout: Duration::from_secs(20),
            performance_timeout: Duration::from_secs(60),
            max_primary_urls: 30,
            max_competitor_groups: 4,
            max_group_urls: 10,
        }
    }
}

/// One competitor domain and its URLs
#[derive(Debug, Clone)]
pub struct CompetitorGroup {
    pub name: String,
    pub urls: Vec<String>,
}

/// Full analysis of one URL
#[derive(Debug, Clone, Serialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub score: ScoreResult,
    pub metrics: UnifiedSeoMetrics,
    pub warnings: Vec<String>,
}

/// Aggregated analysis of one domain
#[derive(Debug, Clone, Serialize)]
pub struct DomainResult {
    pub name: String,
    /// URLs that were actually analyzed, in input order
    pub urls: Vec<String>,
    pub average: ScoreResult,
    pub pages: Vec<UrlAnalysis>,
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<String>,
}

/// Result of a batch scan
#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalysis {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub primary: DomainResult,
    pub competitors: Vec<DomainResult>,
    pub comparison: Option<Comparison>,
}

/// The analysis engine
///
/// All collaborators are injected: providers, inspector, performance
/// analyzer, and admission control, so tests run entirely on fakes.
#[derive(Clone)]
pub struct Analyzer {
    inspector: Arc<dyn PageInspector>,
    performance: Arc<dyn PerformanceAnalyzer>,
    /// Keyword cascade, highest fidelity first
    keyword_providers: Vec<Arc<dyn MetricSource<KeywordMetrics>>>,
    /// Backlink cascade, highest fidelity first
    backlink_providers: Vec<Arc<dyn MetricSource<BacklinkMetrics>>>,
    admission: Arc<dyn AdmissionControl>,
    limits: AnalyzerLimits,
    event_tx: Option<mpsc::Sender<ScanEvent>>,
}

impl Analyzer {
    pub fn new(
        inspector: Arc<dyn PageInspector>,
        performance: Arc<dyn PerformanceAnalyzer>,
    ) -> Self {
        Self {
            inspector,
            performance,
            keyword_providers: Vec::new(),
            backlink_providers: Vec::new(),
            admission: Arc::new(Unlimited),
            limits: AnalyzerLimits::default(),
            event_tx: None,
        }
    }

    /// Build the production analyzer from resolved credentials with the
    /// standard cascade order (keywords: DataForSEO → Search Console;
    /// backlinks: Moz → DataForSEO)
    pub fn from_credentials(credentials: &ProviderCredentials) -> Self {
        let dataforseo = Arc::new(DataForSeoClient::new(
            credentials.dataforseo_login.clone(),
            credentials.dataforseo_password.clone(),
        ));

        Self::new(
            Arc::new(HttpPageInspector::new()),
            Arc::new(PageSpeedClient::new(credentials.pagespeed_api_key.clone())),
        )
        .with_keyword_provider(dataforseo.clone())
        .with_keyword_provider(Arc::new(GscClient::new(
            credentials.gsc_access_token.clone(),
            credentials.gsc_property.clone(),
        )))
        .with_backlink_provider(Arc::new(MozClient::new(
            credentials.moz_access_id.clone(),
            credentials.moz_secret_key.clone(),
        )))
        .with_backlink_provider(dataforseo)
    }

    pub fn with_keyword_provider(
        mut self,
        provider: Arc<dyn MetricSource<KeywordMetrics>>,
    ) -> Self {
        self.keyword_providers.push(provider);
        self
    }

    pub fn with_backlink_provider(
        mut self,
        provider: Arc<dyn MetricSource<BacklinkMetrics>>,
    ) -> Self {
        self.backlink_providers.push(provider);
        self
    }

    pub fn with_admission(mut self, admission: Arc<dyn AdmissionControl>) -> Self {
        self.admission = admission;
        self
    }

    pub fn with_limits(mut self, limits: AnalyzerLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_events(mut self, event_tx: mpsc::Sender<ScanEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Emit a progress event; best-effort, never blocks the pipeline on
    /// a slow listener
    async fn emit_event(&self, event: ScanEvent) {
        if let Some(tx) = &self.event_tx {
            if tx.send(event).await.is_err() {
                debug!("scan event listener dropped");
            }
        }
    }

    // ========================================================================
    // Per-URL analysis
    // ========================================================================

    /// Analyze one URL: fan out inspection, performance, and both
    /// cascades; join; score
    ///
    /// Never fails on provider errors; only on malformed input or a
    /// failed page inspection.
    pub async fn analyze_url(&self, raw_url: &str) -> EngineResult<UrlAnalysis> {
        let url = normalize_url(raw_url)
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;
        let domain = domain_of(&url);

        debug!(url = %url, domain = %domain, "analyzing URL");

        let inspect_branch =
            tokio::time::timeout(self.limits.inspection_timeout, self.inspector.inspect(&url));

        let perf_branch = async {
            if !self.performance.is_configured() {
                return Err(ProviderError::NotConfigured);
            }
            match tokio::time::timeout(
                self.limits.performance_timeout,
                self.performance.analyze(&url),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.limits.performance_timeout)),
            }
        };

        let keyword_branch = run_cascade(
            MetricFamily::Keywords,
            &self.keyword_providers,
            &domain,
            self.limits.provider_timeout,
        );
        let backlink_branch = run_cascade(
            MetricFamily::Backlinks,
            &self.backlink_providers,
            &domain,
            self.limits.provider_timeout,
        );

        let (inspected, perf_result, keyword_outcome, backlink_outcome) =
            tokio::join!(inspect_branch, perf_branch, keyword_branch, backlink_branch);

        // Page inspection is the one branch the score cannot do without.
        let facts = match inspected {
            Ok(Ok(facts)) => facts,
            Ok(Err(e)) => {
                return Err(EngineError::PageInspection {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(EngineError::PageInspection {
                    url: url.to_string(),
                    message: format!(
                        "timed out after {:?}",
                        self.limits.inspection_timeout
                    ),
                })
            }
        };

        for outcome_info in [
            (MetricFamily::Keywords, keyword_outcome.fell_back(), keyword_outcome.source),
            (MetricFamily::Backlinks, backlink_outcome.fell_back(), backlink_outcome.source),
        ] {
            let (family, fell_back, source) = outcome_info;
            if fell_back {
                self.emit_event(ScanEvent::ProviderFellBack {
                    family,
                    source: source.unwrap_or(ESTIMATE_SOURCE).to_string(),
                })
                .await;
            }
        }

        let mut failures: Vec<ProviderFailure> = keyword_outcome.failures;
        failures.extend(backlink_outcome.failures);

        let keywords = keyword_outcome
            .value
            .unwrap_or_else(|| estimate_keywords(&facts));
        let backlinks = backlink_outcome
            .value
            .unwrap_or_else(|| estimate_backlinks(&facts));

        let metrics = UnifiedSeoMetrics {
            keywords,
            backlinks,
            source: MetricSources {
                keywords: keyword_outcome.source.unwrap_or(ESTIMATE_SOURCE).to_string(),
                backlinks: backlink_outcome
                    .source
                    .unwrap_or(ESTIMATE_SOURCE)
                    .to_string(),
            },
            errors: failures.iter().map(|f| f.to_error_string()).collect(),
        };

        let (perf, perf_error) = match perf_result {
            Ok(facts) => (Some(facts), None),
            Err(ProviderError::NotConfigured) => (None, None),
            Err(e) => {
                warn!(url = %url, "performance branch failed: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let score = score_url(&facts, perf.as_ref(), &metrics);
        let warnings = crate::warnings::build_warnings(
            &metrics,
            &failures,
            &score.data_source,
            perf_error.as_deref(),
        );

        info!(
            url = %url,
            total = score.total,
            keywords_source = %metrics.source.keywords,
            backlinks_source = %metrics.source.backlinks,
            "URL analysis complete"
        );

        Ok(UrlAnalysis {
            url: url.to_string(),
            score,
            metrics,
            warnings,
        })
    }

    // ========================================================================
    // Batch analysis
    // ========================================================================

    /// Analyze a batch of primary URLs plus optional competitor groups
    ///
    /// Fails only on admission rejection, cancellation, or when zero
    /// primary URLs could be analyzed.
    pub async fn analyze_batch(
        &self,
        caller: &str,
        urls: &[String],
        competitor_groups: &[CompetitorGroup],
        cancel: CancellationToken,
    ) -> EngineResult<BatchAnalysis> {
        if !self.admission.try_admit(caller) {
            return Err(EngineError::RateLimited(format!(
                "caller '{}' exceeded batch quota",
                caller
            )));
        }
        if urls.is_empty() {
            return Err(EngineError::InvalidInput("empty URL list".to_string()));
        }

        let batch_id = Uuid::new_v4();
        self.emit_event(ScanEvent::BatchStarted {
            batch_id,
            url_count: urls.len(),
            competitor_groups: competitor_groups.len(),
        })
        .await;

        let mut batch_warnings = Vec::new();
        let primary_urls = truncated(urls, self.limits.max_primary_urls, "URL", &mut batch_warnings);

        let semaphore = Arc::new(Semaphore::new(self.limits.max_concurrency));

        let mut primary = self
            .analyze_domain(None, &primary_urls, &semaphore, &cancel)
            .await?;
        primary.warnings.extend(batch_warnings);

        let mut competitors = Vec::new();
        let groups: Vec<&CompetitorGroup> = competitor_groups
            .iter()
            .take(self.limits.max_competitor_groups)
            .collect();
        if competitor_groups.len() > groups.len() {
            primary.warnings.push(format!(
                "competitor group limit is {}; extra groups were skipped",
                self.limits.max_competitor_groups
            ));
        }

        let group_results = futures::future::join_all(groups.iter().map(|group| {
            let mut group_warnings = Vec::new();
            let group_urls = truncated(
                &group.urls,
                self.limits.max_group_urls,
                "competitor URL",
                &mut group_warnings,
            );
            let name = group.name.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            async move {
                let result = self
                    .analyze_domain(Some(name.clone()), &group_urls, &semaphore, &cancel)
                    .await;
                (name, group_warnings, result)
            }
        }))
        .await;

        for (name, group_warnings, result) in group_results {
            match result {
                Ok(mut domain) => {
                    domain.warnings.extend(group_warnings);
                    competitors.push(domain);
                }
                Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
                Err(e) => {
                    warn!(competitor = %name, "competitor group skipped: {}", e);
                    primary
                        .warnings
                        .push(format!("competitor '{}' skipped: {}", name, e));
                }
            }
        }

        let comparison = if competitors.is_empty() {
            None
        } else {
            let rivals: Vec<(String, ScoreResult)> = competitors
                .iter()
                .map(|c| (c.name.clone(), c.average.clone()))
                .collect();
            Some(compare_scores(&primary.name, &primary.average, &rivals))
        };

        self.emit_event(ScanEvent::BatchCompleted {
            batch_id,
            analyzed: primary.urls.len() + competitors.iter().map(|c| c.urls.len()).sum::<usize>(),
        })
        .await;

        Ok(BatchAnalysis {
            batch_id,
            generated_at: Utc::now(),
            primary,
            competitors,
            comparison,
        })
    }

    /// Analyze one domain's URL list with bounded parallelism,
    /// preserving input order
    async fn analyze_domain(
        &self,
        name: Option<String>,
        urls: &[String],
        semaphore: &Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> EngineResult<DomainResult> {
        let mut warnings = Vec::new();

        // Validate up front; malformed entries are dropped, never fatal.
        let mut valid_urls = Vec::new();
        for raw in urls {
            match normalize_url(raw) {
                Ok(url) => valid_urls.push(url.to_string()),
                Err(e) => {
                    warn!(url = %raw, "dropping malformed URL: {}", e);
                    warnings.push(format!("'{}' dropped: {}", raw, e));
                }
            }
        }
        if valid_urls.is_empty() {
            return Err(EngineError::Exhausted(
                "every URL in the list was malformed".to_string(),
            ));
        }

        let mut handles = Vec::with_capacity(valid_urls.len());
        for url in &valid_urls {
            let analyzer = self.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let url = url.clone();
            handles.push(tokio::spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                    permit = semaphore.acquire_owned() => {
                        permit.map_err(|_| EngineError::Cancelled)?
                    }
                };
                analyzer.emit_event(ScanEvent::UrlStarted { url: url.clone() }).await;
                tokio::select! {
                    _ = cancel.cancelled() => Err(EngineError::Cancelled),
                    result = analyzer.analyze_url(&url) => result,
                }
            }));
        }

        // Awaiting in spawn order keeps output order equal to input order.
        let mut pages = Vec::new();
        for (handle, url) in handles.into_iter().zip(&valid_urls) {
            match handle.await {
                Ok(Ok(analysis)) => {
                    self.emit_event(ScanEvent::UrlCompleted {
                        url: url.clone(),
                        total: analysis.score.total,
                    })
                    .await;
                    pages.push(analysis);
                }
                Ok(Err(EngineError::Cancelled)) => return Err(EngineError::Cancelled),
                Ok(Err(e)) => {
                    self.emit_event(ScanEvent::UrlFailed {
                        url: url.clone(),
                        error: e.to_string(),
                    })
                    .await;
                    warnings.push(format!("'{}' skipped: {}", url, e));
                }
                Err(e) => {
                    warnings.push(format!("'{}' skipped: analysis task failed: {}", url, e));
                }
            }
        }

        // Partial results are discarded on cancellation, not returned.
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if pages.is_empty() {
            return Err(EngineError::Exhausted(format!(
                "none of the {} URL(s) could be analyzed",
                valid_urls.len()
            )));
        }

        let scores: Vec<ScoreResult> = pages.iter().map(|p| p.score.clone()).collect();
        let average = average_scores(&scores);
        let mut recommendations = generate_recommendations(&average);
        recommendations.truncate(MAX_RECOMMENDATIONS);

        // Page-level warnings roll up, deduplicated, behind domain-level ones.
        for page in &pages {
            for warning in &page.warnings {
                if !warnings.contains(warning) {
                    warnings.push(warning.clone());
                }
            }
        }

        let name = name.unwrap_or_else(|| {
            normalize_url(&pages[0].url)
                .map(|u| domain_of(&u))
                .unwrap_or_else(|_| pages[0].url.clone())
        });

        Ok(DomainResult {
            name,
            urls: pages.iter().map(|p| p.url.clone()).collect(),
            average,
            pages,
            recommendations,
            warnings,
        })
    }
}

/// Truncate a URL list to a limit, recording a warning when entries
/// were dropped
fn truncated(
    urls: &[String],
    limit: usize,
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    if urls.len() > limit {
        warnings.push(format!(
            "{} limit is {}; {} entr(ies) were skipped",
            label,
            limit,
            urls.len() - limit
        ));
    }
    urls.iter().take(limit).cloned().collect()
}
