//! Aggregation & Comparison Engine
//!
//! Folds per-URL scores into a domain average (arithmetic mean,
//! pillar-by-pillar and metric-by-metric, data-source flags OR-reduced)
//! and ranks a primary domain against its competitors pillar by pillar
//! with ties broken by total score. Ordered numeric comparison only; no
//! statistical inference.

use crate::scoring::{
    DataSourceFlags, Metric, MetricValue, PillarBreakdown, PillarId, ScoreBreakdown, ScoreResult,
};
use serde::{Deserialize, Serialize};

/// Average a batch of URL scores into one domain-level score
///
/// Averaging N identical results returns that result; text-valued
/// metrics keep the first result's value and insight as representative.
pub fn average_scores(results: &[ScoreResult]) -> ScoreResult {
    if results.is_empty() {
        return ScoreResult::default();
    }
    if results.len() == 1 {
        return results[0].clone();
    }

    let n = results.len() as f64;
    let mean = |select: fn(&ScoreResult) -> f64| results.iter().map(select).sum::<f64>() / n;

    let content_structure = mean(|r| r.content_structure);
    let brand_ranking = mean(|r| r.brand_ranking);
    let website_technical = mean(|r| r.website_technical);
    let keyword_visibility = mean(|r| r.keyword_visibility);
    let ai_trust = mean(|r| r.ai_trust);

    let breakdown = ScoreBreakdown {
        content_structure: average_breakdown(results, PillarId::ContentStructure),
        brand_ranking: average_breakdown(results, PillarId::BrandRanking),
        website_technical: average_breakdown(results, PillarId::WebsiteTechnical),
        keyword_visibility: average_breakdown(results, PillarId::KeywordVisibility),
        ai_trust: average_breakdown(results, PillarId::AiTrust),
    };

    let data_source = results
        .iter()
        .map(|r| r.data_source)
        .fold(DataSourceFlags::default(), |acc, f| acc.merge(&f));

    // Same single-rounding rule as per-URL scoring.
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

/// Metric-by-metric mean over one pillar; keys and order come from the
/// first result
fn average_breakdown(results: &[ScoreResult], pillar: PillarId) -> PillarBreakdown {
    let n = results.len() as f64;
    let first = results[0].breakdown.pillar(pillar);
    let mut averaged = PillarBreakdown::default();

    for entry in &first.entries {
        let scores: f64 = results
            .iter()
            .filter_map(|r| r.breakdown.pillar(pillar).get(&entry.key))
            .map(|m| m.score)
            .sum();

        let value = match &entry.metric.value {
            MetricValue::Number(_) => {
                let numbers: Vec<f64> = results
                    .iter()
                    .filter_map(|r| r.breakdown.pillar(pillar).get(&entry.key))
                    .filter_map(|m| match m.value {
                        MetricValue::Number(v) => Some(v),
                        _ => None,
                    })
                    .collect();
                if numbers.is_empty() {
                    MetricValue::Missing
                } else {
                    MetricValue::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            other => other.clone(),
        };

        let mut metric = Metric::new(
            value,
            scores / n,
            entry.metric.max_score,
            entry.metric.insight.clone(),
        );
        if let Some(rec) = &entry.metric.recommendation {
            metric = metric.with_recommendation(rec.clone());
        }
        averaged.push(&entry.key, metric);
    }

    averaged
}

// ============================================================================
// Comparison
// ============================================================================

/// One domain's standing within a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub name: String,
    pub score: f64,
    pub total: f64,
    pub is_primary: bool,
}

/// Descending ranking for one pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarComparison {
    pub pillar: PillarId,
    pub ranking: Vec<ComparisonEntry>,
}

/// Structured comparison of a primary domain against competitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub pillars: Vec<PillarComparison>,
    pub totals: Vec<ComparisonEntry>,
    /// 1-based rank of the primary domain by total score
    pub primary_rank: usize,
}

/// Rank the primary domain against up to four competitors
pub fn compare_scores(
    primary_name: &str,
    primary: &ScoreResult,
    competitors: &[(String, ScoreResult)],
) -> Comparison {
    let entries: Vec<(&str, &ScoreResult, bool)> = std::iter::once((primary_name, primary, true))
        .chain(
            competitors
                .iter()
                .take(4)
                .map(|(name, score)| (name.as_str(), score, false)),
        )
        .collect();

    let rank = |score_of: &dyn Fn(&ScoreResult) -> f64| -> Vec<ComparisonEntry> {
        let mut ranking: Vec<ComparisonEntry> = entries
            .iter()
            .map(|(name, result, is_primary)| ComparisonEntry {
                name: name.to_string(),
                score: score_of(result),
                total: result.total,
                is_primary: *is_primary,
            })
            .collect();
        // Descending by score, ties broken by total, then by name so the
        // order is fully deterministic.
        ranking.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.total
                        .partial_cmp(&a.total)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.name.cmp(&b.name))
        });
        ranking
    };

    let pillars = PillarId::all()
        .into_iter()
        .map(|pillar| PillarComparison {
            pillar,
            ranking: rank(&move |r: &ScoreResult| r.pillar_score(pillar)),
        })
        .collect();

    let totals = rank(&|r: &ScoreResult| r.total);
    let primary_rank = totals
        .iter()
        .position(|e| e.is_primary)
        .map(|i| i + 1)
        .unwrap_or(1);

    Comparison {
        pillars,
        totals,
        primary_rank,
    }
}

// ============================================================================
// Tests
// ============================================================================
