//! Warning construction
//!
//! Caller-visible warnings name the affected pillar, not just the raw
//! provider error. The mapping from provider + family to affected
//! pillars is a static declarative table consulted once per URL; error
//! strings are never parsed.

use crate::cascade::ProviderFailure;
use crate::scoring::{DataSourceFlags, PillarId};
use crate::types::{MetricFamily, UnifiedSeoMetrics, ESTIMATE_SOURCE};

/// Which pillars and metrics a provider's family feeds
pub struct ProviderImpact {
    pub provider: &'static str,
    pub family: MetricFamily,
    pub pillars: &'static [PillarId],
    pub metrics: &'static [&'static str],
}

/// Every provider/family pair the cascades can try
pub static PROVIDER_IMPACT: &[ProviderImpact] = &[
    ProviderImpact {
        provider: "Moz",
        family: MetricFamily::Backlinks,
        pillars: &[PillarId::AiTrust],
        metrics: &["backlink_quality", "referring_domains"],
    },
    ProviderImpact {
        provider: "DataForSEO",
        family: MetricFamily::Keywords,
        pillars: &[PillarId::KeywordVisibility, PillarId::BrandRanking],
        metrics: &[
            "ranked_keywords",
            "average_position",
            "intent_match",
            "brand_rank",
            "community_sentiment",
        ],
    },
    ProviderImpact {
        provider: "DataForSEO",
        family: MetricFamily::Backlinks,
        pillars: &[PillarId::AiTrust],
        metrics: &["backlink_quality", "referring_domains"],
    },
    ProviderImpact {
        provider: "Search Console",
        family: MetricFamily::Keywords,
        pillars: &[PillarId::KeywordVisibility, PillarId::BrandRanking],
        metrics: &[
            "ranked_keywords",
            "average_position",
            "intent_match",
            "brand_rank",
            "community_sentiment",
        ],
    },
];

fn impact_for(provider: &str, family: MetricFamily) -> Option<&'static ProviderImpact> {
    PROVIDER_IMPACT
        .iter()
        .find(|i| i.provider == provider && i.family == family)
}

fn pillar_list(pillars: &[PillarId]) -> String {
    pillars
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Build the caller-visible warning list for one analyzed URL
///
/// Sources: structured cascade failures, estimate-backed families, and
/// an absent performance branch.
pub fn build_warnings(
    metrics: &UnifiedSeoMetrics,
    failures: &[ProviderFailure],
    flags: &DataSourceFlags,
    perf_error: Option<&str>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    for failure in failures {
        match impact_for(failure.provider, failure.family) {
            Some(impact) => warnings.push(format!(
                "{} may be approximate: {} {} data unavailable ({})",
                pillar_list(impact.pillars),
                failure.provider,
                failure.family,
                failure.message
            )),
            None => warnings.push(format!(
                "{} {} data unavailable ({})",
                failure.provider, failure.family, failure.message
            )),
        }
    }

    if metrics.source.keywords == ESTIMATE_SOURCE {
        warnings.push(
            "Keyword Visibility and Brand Ranking are based on heuristic estimates; \
             configure DataForSEO or Search Console credentials for measured data"
                .to_string(),
        );
    }
    if metrics.source.backlinks == ESTIMATE_SOURCE {
        warnings.push(
            "AI Trust is based on heuristic estimates; configure Moz or DataForSEO \
             credentials for measured backlink data"
                .to_string(),
        );
    }

    if !flags.pagespeed {
        let detail = perf_error.unwrap_or("performance analyzer unavailable");
        warnings.push(format!(
            "Website Technical may be approximate: Core Web Vitals and mobile \
             performance scored without data ({})",
            detail
        ));
    }

    warnings
}
