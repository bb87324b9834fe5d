//! AI Trust pillar (22 points)
//!
//! Signals AI assistants weigh when deciding whether to cite a site:
//! backlink authority, referring-domain breadth, content sentiment,
//! E-E-A-T markup, and local presence.

use super::{step_at_least, Metric, PillarBreakdown};
use crate::types::{BacklinkMetrics, PageFacts};

const BACKLINK_QUALITY_MAX: f64 = 6.0;
const REFERRING_DOMAINS_MAX: f64 = 5.0;
const CONTENT_SENTIMENT_MAX: f64 = 3.0;
const EEAT_MAX: f64 = 5.0;
const GEO_MAX: f64 = 3.0;

/// External citations needed for full E-E-A-T credit
const CITATION_THRESHOLD: u32 = 3;

pub fn score(facts: &PageFacts, backlinks: &BacklinkMetrics) -> PillarBreakdown {
    let mut breakdown = PillarBreakdown::default();

    let quality_score = step_at_least(
        backlinks.domain_rating,
        &[(70.0, BACKLINK_QUALITY_MAX), (40.0, 4.0), (20.0, 2.0)],
    );
    let mut quality = Metric::new(
        backlinks.domain_rating,
        quality_score,
        BACKLINK_QUALITY_MAX,
        format!("Domain rating {:.0}/100", backlinks.domain_rating),
    );
    if quality_score < BACKLINK_QUALITY_MAX {
        quality = quality.with_recommendation(
            "Earn links from authoritative domains; rating tiers unlock at 20, 40, and 70",
        );
    }
    breakdown.push("backlink_quality", quality);

    let referring_score = step_at_least(
        backlinks.referring_domains as f64,
        &[(500.0, REFERRING_DOMAINS_MAX), (100.0, 4.0), (20.0, 2.0), (1.0, 1.0)],
    );
    let mut referring = Metric::new(
        backlinks.referring_domains,
        referring_score,
        REFERRING_DOMAINS_MAX,
        format!("{} referring domain(s)", backlinks.referring_domains),
    );
    if referring_score < REFERRING_DOMAINS_MAX {
        referring = referring
            .with_recommendation("Broaden the referring-domain base beyond a few linking sites");
    }
    breakdown.push("referring_domains", referring);

    let sentiment_score = step_at_least(
        facts.sentiment_hint,
        &[(0.7, CONTENT_SENTIMENT_MAX), (0.45, 2.0), (0.25, 1.0)],
    );
    let mut sentiment = Metric::new(
        facts.sentiment_hint,
        sentiment_score,
        CONTENT_SENTIMENT_MAX,
        format!("Content sentiment hint {:.2}", facts.sentiment_hint),
    );
    if sentiment_score < CONTENT_SENTIMENT_MAX {
        sentiment = sentiment
            .with_recommendation("Review page copy for negative or spammy phrasing");
    }
    breakdown.push("content_sentiment", sentiment);

    // E-E-A-T: author markup (2) + external citations (3)
    let author_points = if facts.has_author_schema { 2.0 } else { 0.0 };
    let citation_points = if facts.citation_count >= CITATION_THRESHOLD {
        3.0
    } else if facts.citation_count >= 1 {
        1.5
    } else {
        0.0
    };
    let mut eeat = Metric::new(
        format!(
            "author markup: {}, {} citation(s)",
            if facts.has_author_schema { "yes" } else { "no" },
            facts.citation_count
        ),
        author_points + citation_points,
        EEAT_MAX,
        if facts.has_author_schema {
            "Author credentials are machine-readable".to_string()
        } else {
            "No author/credential markup".to_string()
        },
    );
    if author_points + citation_points < EEAT_MAX {
        eeat = eeat.with_recommendation(
            "Attribute content to an author with Person schema and cite at least three \
             external sources",
        );
    }
    breakdown.push("eeat_signals", eeat);

    let geo = if facts.has_local_signals {
        Metric::new("present", GEO_MAX, GEO_MAX, "Local business signals present")
    } else {
        Metric::new("absent", 0.0, GEO_MAX, "No local/GEO signals")
            .with_recommendation(
                "Add LocalBusiness schema with a postal address if the business serves a \
                 physical area",
            )
    };
    breakdown.push("geo_signals", geo);

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trusted_site() -> (PageFacts, BacklinkMetrics) {
        (
            PageFacts {
                has_author_schema: true,
                citation_count: 5,
                has_local_signals: true,
                sentiment_hint: 0.8,
                ..Default::default()
            },
            BacklinkMetrics {
                domain_rating: 82.0,
                total_backlinks: 40_000,
                referring_domains: 900,
            },
        )
    }

    #[test]
    fn test_budget_is_22() {
        let breakdown = score(&PageFacts::default(), &BacklinkMetrics::default());
        assert_eq!(breakdown.max_sum(), 22.0);
    }

    #[test]
    fn test_trusted_site_scores_full() {
        let (facts, backlinks) = trusted_site();
        let breakdown = score(&facts, &backlinks);
        assert_eq!(breakdown.score_sum(), 22.0);
    }

    #[test]
    fn test_defaults_score_zero() {
        let breakdown = score(&PageFacts::default(), &BacklinkMetrics::default());
        assert_eq!(breakdown.score_sum(), 0.0);
    }

    #[test]
    fn test_authority_tiers() {
        for (rating, expected) in [(75.0, 6.0), (45.0, 4.0), (25.0, 2.0), (10.0, 0.0)] {
            let backlinks = BacklinkMetrics {
                domain_rating: rating,
                ..Default::default()
            };
            let breakdown = score(&PageFacts::default(), &backlinks);
            assert_eq!(breakdown.get("backlink_quality").unwrap().score, expected);
        }
    }

    #[test]
    fn test_eeat_partial_credit() {
        let facts = PageFacts {
            has_author_schema: false,
            citation_count: 1,
            ..Default::default()
        };
        let breakdown = score(&facts, &BacklinkMetrics::default());
        assert_eq!(breakdown.get("eeat_signals").unwrap().score, 1.5);

        let facts = PageFacts {
            has_author_schema: true,
            citation_count: 0,
            ..Default::default()
        };
        let breakdown = score(&facts, &BacklinkMetrics::default());
        assert_eq!(breakdown.get("eeat_signals").unwrap().score, 2.0);
    }

    #[test]
    fn test_neutral_sentiment_gets_middle_tier() {
        let facts = PageFacts {
            sentiment_hint: 0.5,
            ..Default::default()
        };
        let breakdown = score(&facts, &BacklinkMetrics::default());
        assert_eq!(breakdown.get("content_sentiment").unwrap().score, 2.0);
    }
}
