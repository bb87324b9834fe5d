//! Keyword Visibility pillar (23 points)
//!
//! Breadth and quality of organic visibility: how many keywords the
//! domain ranks for, how high, and whether they match discovery intent.

use super::{step_at_least, step_at_most, Metric, PillarBreakdown};
use crate::types::KeywordMetrics;

const RANKED_KEYWORDS_MAX: f64 = 9.0;
const AVERAGE_POSITION_MAX: f64 = 8.0;
const INTENT_MATCH_MAX: f64 = 6.0;

pub fn score(keywords: &KeywordMetrics) -> PillarBreakdown {
    let mut breakdown = PillarBreakdown::default();

    let count_score = step_at_least(
        keywords.total_keywords as f64,
        &[(500.0, RANKED_KEYWORDS_MAX), (100.0, 7.0), (20.0, 5.0), (1.0, 3.0)],
    );
    let mut ranked = Metric::new(
        keywords.total_keywords,
        count_score,
        RANKED_KEYWORDS_MAX,
        format!("Ranks for {} keyword(s)", keywords.total_keywords),
    );
    if count_score < RANKED_KEYWORDS_MAX {
        ranked = ranked.with_recommendation(
            "Target more queries with dedicated pages; visibility compounds with \
             ranked-keyword breadth",
        );
    }
    breakdown.push("ranked_keywords", ranked);

    // Lower is better; zero means no position data at all
    let position_score = step_at_most(
        keywords.avg_position,
        &[(3.0, AVERAGE_POSITION_MAX), (10.0, 6.0), (20.0, 3.0)],
    );
    let mut position = Metric::new(
        keywords.avg_position,
        position_score,
        AVERAGE_POSITION_MAX,
        if keywords.avg_position > 0.0 {
            format!("Average position {:.1}", keywords.avg_position)
        } else {
            "No position data".to_string()
        },
    );
    if position_score < AVERAGE_POSITION_MAX {
        position = position.with_recommendation(
            "Improve content and internal linking on pages ranking beyond position 3",
        );
    }
    breakdown.push("average_position", position);

    let intent_score = step_at_least(
        keywords.intent_match_pct,
        &[(70.0, INTENT_MATCH_MAX), (40.0, 4.0), (20.0, 2.0)],
    );
    let mut intent = Metric::new(
        keywords.intent_match_pct,
        intent_score,
        INTENT_MATCH_MAX,
        format!(
            "{:.0}% of keywords match discovery intent",
            keywords.intent_match_pct
        ),
    );
    if intent_score < INTENT_MATCH_MAX {
        intent = intent.with_recommendation(
            "Cover informational and commercial queries, not just navigational ones",
        );
    }
    breakdown.push("intent_match", intent);

    breakdown
}
