//! Scoring Engine
//!
//! Converts normalized metrics, page facts, and performance facts into a
//! capped, explainable score: five independently-scored pillars, each a
//! sum of bucketed sub-metric scores.
//!
//! Two clamps are mandatory and are the only defense against a
//! sub-metric bug silently inflating a pillar: every sub-metric score is
//! clamped to `[0, max_score]` when the `Metric` is constructed, and
//! every pillar sum is clamped to the pillar budget before entering the
//! total. The total is rounded exactly once, at the end.

pub mod ai_trust;
pub mod brand_ranking;
pub mod content_structure;
pub mod keyword_visibility;
pub mod recommendations;
pub mod website_technical;

use crate::types::{PageFacts, PerfFacts, UnifiedSeoMetrics};
use serde::{Deserialize, Serialize};

// ============================================================================
// Pillar budgets (authoritative point set)
// ============================================================================

pub const CONTENT_STRUCTURE_BUDGET: f64 = 25.0;
pub const BRAND_RANKING_BUDGET: f64 = 9.0;
pub const WEBSITE_TECHNICAL_BUDGET: f64 = 17.0;
pub const KEYWORD_VISIBILITY_BUDGET: f64 = 23.0;
pub const AI_TRUST_BUDGET: f64 = 22.0;

/// Sum of the five pillar budgets
pub const TOTAL_BUDGET: f64 = CONTENT_STRUCTURE_BUDGET
    + BRAND_RANKING_BUDGET
    + WEBSITE_TECHNICAL_BUDGET
    + KEYWORD_VISIBILITY_BUDGET
    + AI_TRUST_BUDGET;

/// The five scoring pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarId {
    ContentStructure,
    BrandRanking,
    WebsiteTechnical,
    KeywordVisibility,
    AiTrust,
}

impl PillarId {
    pub fn all() -> [PillarId; 5] {
        [
            PillarId::ContentStructure,
            PillarId::BrandRanking,
            PillarId::WebsiteTechnical,
            PillarId::KeywordVisibility,
            PillarId::AiTrust,
        ]
    }

    pub fn budget(&self) -> f64 {
        match self {
            PillarId::ContentStructure => CONTENT_STRUCTURE_BUDGET,
            PillarId::BrandRanking => BRAND_RANKING_BUDGET,
            PillarId::WebsiteTechnical => WEBSITE_TECHNICAL_BUDGET,
            PillarId::KeywordVisibility => KEYWORD_VISIBILITY_BUDGET,
            PillarId::AiTrust => AI_TRUST_BUDGET,
        }
    }
}

impl std::fmt::Display for PillarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PillarId::ContentStructure => "Content Structure",
            PillarId::BrandRanking => "Brand Ranking",
            PillarId::WebsiteTechnical => "Website Technical",
            PillarId::KeywordVisibility => "Keyword Visibility",
            PillarId::AiTrust => "AI Trust",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Metric model
// ============================================================================

/// Raw value behind a sub-metric score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Number(v as f64)
    }
}

impl From<u32> for MetricValue {
    fn from(v: u32) -> Self {
        MetricValue::Number(v as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// One scored sub-metric with its raw value and explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: MetricValue,
    pub score: f64,
    pub max_score: f64,
    pub insight: String,
    pub recommendation: Option<String>,
}

impl Metric {
    /// Create a metric; the score is clamped to `[0, max_score]` here,
    /// unconditionally, and non-finite scores collapse to zero
    pub fn new(
        value: impl Into<MetricValue>,
        score: f64,
        max_score: f64,
        insight: impl Into<String>,
    ) -> Self {
        let max_score = max_score.max(0.0);
        let score = if score.is_finite() {
            score.clamp(0.0, max_score)
        } else {
            0.0
        };
        Self {
            value: value.into(),
            score,
            max_score,
            insight: insight.into(),
            recommendation: None,
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn points_lost(&self) -> f64 {
        self.max_score - self.score
    }
}

/// One entry of a pillar breakdown, keyed for lookup and kept in
/// insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub key: String,
    #[serde(flatten)]
    pub metric: Metric,
}

/// Ordered metric-key → metric mapping for one pillar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PillarBreakdown {
    pub entries: Vec<MetricEntry>,
}

impl PillarBreakdown {
    pub fn push(&mut self, key: &str, metric: Metric) {
        self.entries.push(MetricEntry {
            key: key.to_string(),
            metric,
        });
    }

    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.metric)
    }

    pub fn score_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.metric.score).sum()
    }

    pub fn max_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.metric.max_score).sum()
    }
}

// ============================================================================
// Score result
// ============================================================================

/// Which upstream sources contributed to a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceFlags {
    pub moz: bool,
    pub dataforseo: bool,
    pub gsc: bool,
    pub pagespeed: bool,
}

impl DataSourceFlags {
    /// OR-reduction used when averaging across URLs
    pub fn merge(&self, other: &DataSourceFlags) -> DataSourceFlags {
        DataSourceFlags {
            moz: self.moz || other.moz,
            dataforseo: self.dataforseo || other.dataforseo,
            gsc: self.gsc || other.gsc,
            pagespeed: self.pagespeed || other.pagespeed,
        }
    }
}

/// Per-pillar breakdowns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub content_structure: PillarBreakdown,
    pub brand_ranking: PillarBreakdown,
    pub website_technical: PillarBreakdown,
    pub keyword_visibility: PillarBreakdown,
    pub ai_trust: PillarBreakdown,
}

impl ScoreBreakdown {
    pub fn pillar(&self, id: PillarId) -> &PillarBreakdown {
        match id {
            PillarId::ContentStructure => &self.content_structure,
            PillarId::BrandRanking => &self.brand_ranking,
            PillarId::WebsiteTechnical => &self.website_technical,
            PillarId::KeywordVisibility => &self.keyword_visibility,
            PillarId::AiTrust => &self.ai_trust,
        }
    }
}

/// Complete score for one URL (or one domain average)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: f64,
    pub content_structure: f64,
    pub brand_ranking: f64,
    pub website_technical: f64,
    pub keyword_visibility: f64,
    pub ai_trust: f64,
    pub breakdown: ScoreBreakdown,
    pub data_source: DataSourceFlags,
}

impl ScoreResult {
    pub fn pillar_score(&self, id: PillarId) -> f64 {
        match id {
            PillarId::ContentStructure => self.content_structure,
            PillarId::BrandRanking => self.brand_ranking,
            PillarId::WebsiteTechnical => self.website_technical,
            PillarId::KeywordVisibility => self.keyword_visibility,
            PillarId::AiTrust => self.ai_trust,
        }
    }
}

// ============================================================================
// Step functions
// ============================================================================

/// Monotone "at least" step: first bucket whose threshold the value
/// meets wins; buckets are listed best-first. Non-finite values score 0.
pub(crate) fn step_at_least(value: f64, buckets: &[(f64, f64)]) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    for &(threshold, points) in buckets {
        if value >= threshold {
            return points;
        }
    }
    0.0
}

/// Monotone "at most" step for lower-is-better metrics; zero and
/// negative values mean "no data" and score 0
pub(crate) fn step_at_most(value: f64, buckets: &[(f64, f64)]) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    for &(threshold, points) in buckets {
        if value <= threshold {
            return points;
        }
    }
    0.0
}

// ============================================================================
// Entry point
// ============================================================================

/// Score one URL from its page facts, optional performance facts, and
/// fused provider metrics
///
/// Always produces a complete result; missing upstream data degrades
/// individual sub-metrics toward their floor.
pub fn score_url(
    facts: &PageFacts,
    perf: Option<&PerfFacts>,
    metrics: &UnifiedSeoMetrics,
) -> ScoreResult {
    let breakdown = ScoreBreakdown {
        content_structure: content_structure::score(facts),
        brand_ranking: brand_ranking::score(&metrics.keywords),
        website_technical: website_technical::score(facts, perf),
        keyword_visibility: keyword_visibility::score(&metrics.keywords),
        ai_trust: ai_trust::score(facts, &metrics.backlinks),
    };

    let content_structure = breakdown
        .content_structure
        .score_sum()
        .clamp(0.0, CONTENT_STRUCTURE_BUDGET);
    let brand_ranking = breakdown
        .brand_ranking
        .score_sum()
        .clamp(0.0, BRAND_RANKING_BUDGET);
    let website_technical = breakdown
        .website_technical
        .score_sum()
        .clamp(0.0, WEBSITE_TECHNICAL_BUDGET);
    let keyword_visibility = breakdown
        .keyword_visibility
        .score_sum()
        .clamp(0.0, KEYWORD_VISIBILITY_BUDGET);
    let ai_trust = breakdown.ai_trust.score_sum().clamp(0.0, AI_TRUST_BUDGET);

    let data_source = DataSourceFlags {
        moz: metrics.source.backlinks == "Moz",
        dataforseo: metrics.source.keywords == "DataForSEO"
            || metrics.source.backlinks == "DataForSEO",
        gsc: metrics.source.keywords == "Search Console",
        pagespeed: perf.is_some(),
    };

    // Single rounding step; pillar scores stay unrounded to avoid drift.
    let total =
        (content_structure + brand_ranking + website_technical + keyword_visibility + ai_trust)
            .round();

    ScoreResult {
        total,
        content_structure,
        brand_ranking,
        website_technical,
        keyword_visibility,
        ai_trust,
        breakdown,
        data_source,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricSources;

    #[test]
    fn test_metric_clamps_score() {
        let over = Metric::new(1u64, 99.0, 5.0, "over");
        assert_eq!(over.score, 5.0);

        let under = Metric::new(1u64, -3.0, 5.0, "under");
        assert_eq!(under.score, 0.0);

        let nan = Metric::new(1u64, f64::NAN, 5.0, "nan");
        assert_eq!(nan.score, 0.0);
    }

    #[test]
    fn test_pillar_budgets_sum_to_total() {
        let sum: f64 = PillarId::all().iter().map(|p| p.budget()).sum();
        assert_eq!(sum, TOTAL_BUDGET);
        assert_eq!(TOTAL_BUDGET, 96.0);
    }

    #[test]
    fn test_every_pillar_breakdown_matches_its_budget() {
        // Budgets are structural: any input must produce breakdowns
        // whose max_score sums equal the pillar budget exactly.
        let facts = PageFacts::default();
        let metrics = UnifiedSeoMetrics::default();
        let result = score_url(&facts, None, &metrics);

        for pillar in PillarId::all() {
            assert_eq!(
                result.breakdown.pillar(pillar).max_sum(),
                pillar.budget(),
                "budget mismatch for {}",
                pillar
            );
        }
    }

    #[test]
    fn test_total_is_single_rounded_sum() {
        let facts = PageFacts {
            word_count: 900,
            https: true,
            ..Default::default()
        };
        let metrics = UnifiedSeoMetrics::default();
        let result = score_url(&facts, None, &metrics);

        let expected = (result.content_structure
            + result.brand_ranking
            + result.website_technical
            + result.keyword_visibility
            + result.ai_trust)
            .round();
        assert_eq!(result.total, expected);
        assert!(result.total >= 0.0 && result.total <= TOTAL_BUDGET);
    }

    #[test]
    fn test_data_source_flags_from_sources() {
        let facts = PageFacts::default();
        let metrics = UnifiedSeoMetrics {
            source: MetricSources {
                keywords: "Search Console".to_string(),
                backlinks: "Moz".to_string(),
            },
            ..Default::default()
        };
        let result = score_url(&facts, None, &metrics);
        assert!(result.data_source.gsc);
        assert!(result.data_source.moz);
        assert!(!result.data_source.dataforseo);
        assert!(!result.data_source.pagespeed);
    }

    #[test]
    fn test_step_at_least() {
        let buckets = [(500.0, 9.0), (100.0, 7.0), (20.0, 5.0), (1.0, 3.0)];
        assert_eq!(step_at_least(1000.0, &buckets), 9.0);
        assert_eq!(step_at_least(100.0, &buckets), 7.0);
        assert_eq!(step_at_least(0.0, &buckets), 0.0);
        assert_eq!(step_at_least(-5.0, &buckets), 0.0);
        assert_eq!(step_at_least(f64::NAN, &buckets), 0.0);
    }

    #[test]
    fn test_step_at_most() {
        let buckets = [(3.0, 8.0), (10.0, 6.0), (20.0, 3.0)];
        assert_eq!(step_at_most(2.0, &buckets), 8.0);
        assert_eq!(step_at_most(10.0, &buckets), 6.0);
        assert_eq!(step_at_most(50.0, &buckets), 0.0);
        assert_eq!(step_at_most(0.0, &buckets), 0.0, "zero means no data");
        assert_eq!(step_at_most(f64::NAN, &buckets), 0.0);
    }

    #[test]
    fn test_flags_merge_is_or() {
        let a = DataSourceFlags {
            moz: true,
            ..Default::default()
        };
        let b = DataSourceFlags {
            pagespeed: true,
            ..Default::default()
        };
        let merged = a.merge(&b);
        assert!(merged.moz && merged.pagespeed);
        assert!(!merged.gsc && !merged.dataforseo);
    }
}
