//! Heuristic estimates
//!
//! Conservative fallbacks synthesized from page-inspection signals when
//! every real provider for a metric family is unavailable. Estimates are
//! deterministic, deliberately pessimistic, and always attributed to the
//! `"estimate"` source so the caller can warn about approximate pillars.

use crate::types::{BacklinkMetrics, KeywordMetrics, KeywordTrend, PageFacts};

/// Ceiling on estimated keyword count; a heuristic should never claim
/// broad visibility
const MAX_ESTIMATED_KEYWORDS: u64 = 25;

/// Assumed SERP position when nothing is known; deep enough to score at
/// the fair tier, never the good one
const ESTIMATED_AVG_POSITION: f64 = 45.0;

/// Estimate keyword metrics from page substance
///
/// A page with real content presumably ranks for a handful of long-tail
/// queries; a thin page gets nothing.
pub fn estimate_keywords(facts: &PageFacts) -> KeywordMetrics {
    let total_keywords = (u64::from(facts.word_count) / 200).min(MAX_ESTIMATED_KEYWORDS);

    KeywordMetrics {
        total_keywords,
        avg_position: if total_keywords > 0 {
            ESTIMATED_AVG_POSITION
        } else {
            0.0
        },
        estimated_traffic: total_keywords as f64 * 0.5,
        intent_match_pct: if facts.word_count >= 300 { 20.0 } else { 0.0 },
        brand_best_rank: None,
        trend: KeywordTrend::Stable,
    }
}

/// Estimate backlink metrics from page trust signals
///
/// HTTPS and outbound citations are weak proxies for a site that
/// participates in the link graph at all.
pub fn estimate_backlinks(facts: &PageFacts) -> BacklinkMetrics {
    let base_rating = if facts.https { 10.0 } else { 5.0 };
    let domain_rating = base_rating + f64::from(facts.citation_count.min(8));

    BacklinkMetrics {
        domain_rating,
        total_backlinks: u64::from(facts.citation_count) * 2,
        referring_domains: u64::from(facts.citation_count.min(10)),
    }
}
