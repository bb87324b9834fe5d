//! Brand Ranking pillar (9 points)
//!
//! Whether searching for the brand itself finds the site, plus a
//! community-sentiment heuristic derived from keyword trend.

use super::{Metric, PillarBreakdown};
use crate::types::{KeywordMetrics, KeywordTrend};

const BRAND_RANK_MAX: f64 = 6.0;
const COMMUNITY_SENTIMENT_MAX: f64 = 3.0;

pub fn score(keywords: &KeywordMetrics) -> PillarBreakdown {
    let mut breakdown = PillarBreakdown::default();

    // Full points only at rank #1; partial for top-3/top-10
    let (rank_score, insight) = match keywords.brand_best_rank {
        Some(1) => (BRAND_RANK_MAX, "Brand query ranks #1".to_string()),
        Some(rank @ 2..=3) => (4.0, format!("Brand query ranks #{} (top 3)", rank)),
        Some(rank @ 4..=10) => (2.0, format!("Brand query ranks #{} (top 10)", rank)),
        Some(rank) => (0.0, format!("Brand query ranks #{}", rank)),
        None => (0.0, "No brand query found in ranked keywords".to_string()),
    };
    let mut brand_rank = Metric::new(
        match keywords.brand_best_rank {
            Some(rank) => super::MetricValue::Number(f64::from(rank)),
            None => super::MetricValue::Missing,
        },
        rank_score,
        BRAND_RANK_MAX,
        insight,
    );
    if rank_score < BRAND_RANK_MAX {
        brand_rank = brand_rank.with_recommendation(
            "Strengthen brand presence (consistent naming, profiles, mentions) until a \
             search for the brand ranks #1",
        );
    }
    breakdown.push("brand_rank", brand_rank);

    let sentiment_score = match keywords.trend {
        KeywordTrend::Rising => COMMUNITY_SENTIMENT_MAX,
        KeywordTrend::Stable => 2.0,
        KeywordTrend::Unknown => 1.0,
        KeywordTrend::Declining => 0.0,
    };
    let trend_label = match keywords.trend {
        KeywordTrend::Rising => "rising",
        KeywordTrend::Stable => "stable",
        KeywordTrend::Declining => "declining",
        KeywordTrend::Unknown => "unknown",
    };
    let mut sentiment = Metric::new(
        trend_label,
        sentiment_score,
        COMMUNITY_SENTIMENT_MAX,
        format!("Keyword interest trend is {}", trend_label),
    );
    if sentiment_score < COMMUNITY_SENTIMENT_MAX {
        sentiment = sentiment.with_recommendation(
            "Grow community interest through mentions, reviews, and discussion presence",
        );
    }
    breakdown.push("community_sentiment", sentiment);

    breakdown
}
