//! Metrics Normalizer
//!
//! Pure mapping functions, one per provider response shape, into the two
//! canonical metric structs. Every optional upstream field coalesces to
//! the canonical zero value so the scoring engine never sees a missing
//! field. No I/O and no scoring here.

use crate::providers::dataforseo::{BacklinksSummaryResult, RankedKeywordsResult};
use crate::providers::gsc::SearchAnalyticsResponse;
use crate::providers::moz::MozUrlMetrics;
use crate::providers::pagespeed::PageSpeedResponse;
use crate::types::{BacklinkMetrics, KeywordMetrics, KeywordTrend, PerfCategory, PerfFacts};
use beacon_common::urls::brand_stem;

/// Jaro-Winkler similarity above which a query word matches the brand
const BRAND_SIMILARITY: f64 = 0.88;

/// DataForSEO's domain rank scale tops out at 1000; ours at 100
const DATAFORSEO_RANK_SCALE: f64 = 10.0;

/// Leading query words that mark informational discovery intent
const INFORMATIONAL_MARKERS: &[&str] = &[
    "how", "what", "why", "where", "who", "when", "which", "guide", "tutorial", "best", "vs",
    "review", "compare",
];

// ============================================================================
// Backlink families
// ============================================================================

pub fn backlinks_from_moz(raw: &MozUrlMetrics) -> BacklinkMetrics {
    BacklinkMetrics {
        domain_rating: raw.domain_authority.clamp(0.0, 100.0),
        total_backlinks: raw.external_links_to_root_domain,
        referring_domains: raw.root_domains_to_root_domain,
    }
}

pub fn backlinks_from_dataforseo(raw: &BacklinksSummaryResult) -> BacklinkMetrics {
    BacklinkMetrics {
        domain_rating: (raw.rank / DATAFORSEO_RANK_SCALE).clamp(0.0, 100.0),
        total_backlinks: raw.backlinks,
        referring_domains: raw.referring_domains,
    }
}

// ============================================================================
// Keyword families
// ============================================================================

pub fn keywords_from_dataforseo(raw: &RankedKeywordsResult, domain: &str) -> KeywordMetrics {
    let stem = brand_stem(domain);

    let mut positions = Vec::new();
    let mut traffic = 0.0;
    let mut intent_hits = 0usize;
    let mut intent_known = 0usize;
    let mut brand_best_rank: Option<u32> = None;

    for item in &raw.items {
        let keyword = item
            .keyword_data
            .as_ref()
            .map(|d| d.keyword.as_str())
            .unwrap_or_default();
        let rank = item
            .ranked_serp_element
            .as_ref()
            .and_then(|e| e.serp_item.as_ref())
            .and_then(|s| s.rank_absolute);

        if let Some(rank) = rank {
            positions.push(rank as f64);
            if !keyword.is_empty() && is_brand_keyword(keyword, &stem) {
                brand_best_rank = Some(brand_best_rank.map_or(rank, |b| b.min(rank)));
            }
        }
        traffic += item
            .ranked_serp_element
            .as_ref()
            .and_then(|e| e.serp_item.as_ref())
            .and_then(|s| s.etv)
            .unwrap_or(0.0);

        if let Some(intent) = item
            .keyword_data
            .as_ref()
            .and_then(|d| d.search_intent_info.as_ref())
            .and_then(|i| i.main_intent.as_deref())
        {
            intent_known += 1;
            if matches!(intent, "informational" | "commercial") {
                intent_hits += 1;
            }
        }
    }

    KeywordMetrics {
        total_keywords: raw.total_count.max(raw.items.len() as u64),
        avg_position: mean(&positions),
        estimated_traffic: traffic,
        intent_match_pct: percentage(intent_hits, intent_known),
        brand_best_rank,
        trend: KeywordTrend::Unknown,
    }
}

pub fn keywords_from_gsc(raw: &SearchAnalyticsResponse, domain: &str) -> KeywordMetrics {
    let stem = brand_stem(domain);

    let mut positions = Vec::new();
    let mut traffic = 0.0;
    let mut informational = 0usize;
    let mut brand_best_rank: Option<u32> = None;

    for row in &raw.rows {
        let query = row.keys.first().map(String::as_str).unwrap_or_default();
        if row.position > 0.0 {
            positions.push(row.position);
            if !query.is_empty() && is_brand_keyword(query, &stem) {
                let rank = row.position.round().max(1.0) as u32;
                brand_best_rank = Some(brand_best_rank.map_or(rank, |b| b.min(rank)));
            }
        }
        traffic += row.clicks;
        if looks_informational(query) {
            informational += 1;
        }
    }

    KeywordMetrics {
        total_keywords: raw.rows.len() as u64,
        avg_position: mean(&positions),
        estimated_traffic: traffic,
        intent_match_pct: percentage(informational, raw.rows.len()),
        brand_best_rank,
        trend: KeywordTrend::Unknown,
    }
}

// ============================================================================
// Performance
// ============================================================================

pub fn perf_from_pagespeed(raw: &PageSpeedResponse) -> PerfFacts {
    let metrics = raw.loading_experience.as_ref();
    let vital = |key: &str| {
        metrics
            .and_then(|le| le.metrics.get(key))
            .map(|m| m.percentile)
            .unwrap_or(0.0)
    };

    let category = match metrics.and_then(|le| le.overall_category.as_deref()) {
        Some("FAST") => PerfCategory::Good,
        Some("AVERAGE") => PerfCategory::NeedsImprovement,
        Some("SLOW") => PerfCategory::Poor,
        _ => PerfCategory::Unknown,
    };

    let mobile_score = raw
        .lighthouse_result
        .as_ref()
        .and_then(|lr| lr.categories.as_ref())
        .and_then(|c| c.performance.as_ref())
        .and_then(|p| p.score)
        .map(|s| (s * 100.0).clamp(0.0, 100.0))
        .unwrap_or(0.0);

    PerfFacts {
        lcp_ms: vital("LARGEST_CONTENTFUL_PAINT_MS"),
        inp_ms: vital("INTERACTION_TO_NEXT_PAINT"),
        // CLS percentile is reported scaled by 100
        cls: vital("CUMULATIVE_LAYOUT_SHIFT_SCORE") / 100.0,
        category,
        mobile_score,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Whether a ranked keyword targets the brand itself
///
/// Matches when any query word is close to the domain's brand stem, or
/// the stem appears embedded in the query with spaces removed
/// ("acme widgets", "acmewidgets review").
pub(crate) fn is_brand_keyword(keyword: &str, stem: &str) -> bool {
    if stem.len() < 3 {
        return false;
    }
    let lowered = keyword.to_ascii_lowercase();
    if lowered.replace(' ', "").contains(stem) {
        return true;
    }
    lowered
        .split_whitespace()
        .any(|word| strsim::jaro_winkler(word, stem) >= BRAND_SIMILARITY)
}

/// Question-style heuristic for informational intent (Search Console
/// reports no intent classification)
pub(crate) fn looks_informational(query: &str) -> bool {
    let lowered = query.to_ascii_lowercase();
    lowered
        .split_whitespace()
        .any(|word| INFORMATIONAL_MARKERS.contains(&word))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn percentage(hits: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    hits as f64 * 100.0 / total as f64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_keywords_fixture() -> RankedKeywordsResult {
        serde_json::from_str(
            r#"{
                "total_count": 240,
                "items": [
                    {"keyword_data": {"keyword": "acme widgets",
                                      "search_intent_info": {"main_intent": "navigational"}},
                     "ranked_serp_element": {"serp_item": {"rank_absolute": 1, "etv": 80.0}}},
                    {"keyword_data": {"keyword": "how to clean widgets",
                                      "search_intent_info": {"main_intent": "informational"}},
                     "ranked_serp_element": {"serp_item": {"rank_absolute": 7, "etv": 20.0}}},
                    {"keyword_data": {"keyword": "widget polish",
                                      "search_intent_info": {"main_intent": "commercial"}},
                     "ranked_serp_element": {"serp_item": {"rank_absolute": 10, "etv": 0.0}}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_keywords_from_dataforseo() {
        let metrics = keywords_from_dataforseo(&ranked_keywords_fixture(), "acme.com");
        assert_eq!(metrics.total_keywords, 240);
        assert_eq!(metrics.avg_position, 6.0);
        assert_eq!(metrics.estimated_traffic, 100.0);
        assert_eq!(metrics.brand_best_rank, Some(1));
        // 2 of 3 intents are informational/commercial
        assert!((metrics.intent_match_pct - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_keywords_from_dataforseo_empty() {
        let metrics =
            keywords_from_dataforseo(&RankedKeywordsResult::default(), "acme.com");
        assert_eq!(metrics.total_keywords, 0);
        assert_eq!(metrics.avg_position, 0.0);
        assert_eq!(metrics.brand_best_rank, None);
        assert_eq!(metrics.intent_match_pct, 0.0);
    }

    #[test]
    fn test_keywords_from_gsc() {
        let raw: SearchAnalyticsResponse = serde_json::from_str(
            r#"{"rows": [
                {"keys": ["how to clean widgets"], "clicks": 12.0, "impressions": 340.0, "position": 7.0},
                {"keys": ["acme widgets"], "clicks": 30.0, "impressions": 100.0, "position": 1.4}
            ]}"#,
        )
        .unwrap();

        let metrics = keywords_from_gsc(&raw, "acme.com");
        assert_eq!(metrics.total_keywords, 2);
        assert_eq!(metrics.avg_position, 4.2);
        assert_eq!(metrics.estimated_traffic, 42.0);
        assert_eq!(metrics.brand_best_rank, Some(1));
        assert_eq!(metrics.intent_match_pct, 50.0);
    }

    #[test]
    fn test_backlinks_from_moz_clamps_authority() {
        let raw = MozUrlMetrics {
            domain_authority: 130.0,
            external_links_to_root_domain: 900,
            root_domains_to_root_domain: 45,
        };
        let metrics = backlinks_from_moz(&raw);
        assert_eq!(metrics.domain_rating, 100.0);
        assert_eq!(metrics.total_backlinks, 900);
        assert_eq!(metrics.referring_domains, 45);
    }

    #[test]
    fn test_backlinks_from_dataforseo_rescales_rank() {
        let raw: BacklinksSummaryResult = serde_json::from_str(
            r#"{"rank": 420.0, "backlinks": 12000, "referring_domains": 310}"#,
        )
        .unwrap();
        let metrics = backlinks_from_dataforseo(&raw);
        assert_eq!(metrics.domain_rating, 42.0);
        assert_eq!(metrics.referring_domains, 310);
    }

    #[test]
    fn test_perf_from_pagespeed() {
        let raw: PageSpeedResponse = serde_json::from_str(
            r#"{
                "loadingExperience": {
                    "metrics": {
                        "LARGEST_CONTENTFUL_PAINT_MS": {"percentile": 1800},
                        "INTERACTION_TO_NEXT_PAINT": {"percentile": 150},
                        "CUMULATIVE_LAYOUT_SHIFT_SCORE": {"percentile": 5}
                    },
                    "overall_category": "FAST"
                },
                "lighthouseResult": {"categories": {"performance": {"score": 0.93}}}
            }"#,
        )
        .unwrap();

        let facts = perf_from_pagespeed(&raw);
        assert_eq!(facts.lcp_ms, 1800.0);
        assert_eq!(facts.inp_ms, 150.0);
        assert_eq!(facts.cls, 0.05);
        assert_eq!(facts.category, PerfCategory::Good);
        assert_eq!(facts.mobile_score, 93.0);
    }

    #[test]
    fn test_perf_from_empty_pagespeed_is_zeroed() {
        let facts = perf_from_pagespeed(&PageSpeedResponse::default());
        assert_eq!(facts.lcp_ms, 0.0);
        assert_eq!(facts.mobile_score, 0.0);
        assert_eq!(facts.category, PerfCategory::Unknown);
    }

    #[test]
    fn test_brand_keyword_matching() {
        assert!(is_brand_keyword("acme widgets", "acme"));
        assert!(is_brand_keyword("acmewidgets review", "acme"));
        assert!(is_brand_keyword("acmee", "acme"), "near-miss spelling");
        assert!(!is_brand_keyword("how to clean widgets", "acme"));
        assert!(!is_brand_keyword("anything", "ab"), "short stems never match");
    }

    #[test]
    fn test_informational_heuristic() {
        assert!(looks_informational("how to clean widgets"));
        assert!(looks_informational("best widget polish"));
        assert!(!looks_informational("acme widgets"));
    }
}
