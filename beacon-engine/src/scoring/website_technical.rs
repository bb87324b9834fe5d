//! Website Technical pillar (17 points)
//!
//! Core Web Vitals, mobile performance, transport security, link
//! hygiene, and the two discovery hint files (`llms.txt`, `sitemap.xml`).
//! Vitals thresholds follow the published good/needs-improvement/poor
//! boundaries: LCP 2.5s/4s, INP 200ms/500ms, CLS 0.1/0.25.

use super::{Metric, MetricValue, PillarBreakdown};
use crate::types::{HintFile, PageFacts, PerfFacts};

const CORE_WEB_VITALS_MAX: f64 = 6.0;
const MOBILE_PERFORMANCE_MAX: f64 = 3.0;
const SSL_MAX: f64 = 2.0;
const BROKEN_LINKS_MAX: f64 = 2.0;
const LLMS_TXT_MAX: f64 = 2.0;
const SITEMAP_MAX: f64 = 2.0;

/// Score one vital; a zero reading means "no field data" and earns
/// nothing
fn vital_points(value: f64, good: f64, poor: f64, full: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        0.0
    } else if value < good {
        full
    } else if value < poor {
        full / 2.0
    } else {
        0.0
    }
}

pub fn score(facts: &PageFacts, perf: Option<&PerfFacts>) -> PillarBreakdown {
    let mut breakdown = PillarBreakdown::default();

    // Core Web Vitals: LCP 3 + INP 2 + CLS 1
    let cwv = match perf {
        Some(p) => {
            let lcp = vital_points(p.lcp_ms, 2500.0, 4000.0, 3.0);
            // INP boundaries are inclusive: exactly 200ms still passes.
            let inp = vital_points(p.inp_ms, 201.0, 501.0, 2.0);
            let cls = vital_points(p.cls, 0.1, 0.25, 1.0);
            let score = lcp + inp + cls;
            let mut metric = Metric::new(
                format!(
                    "LCP {:.0}ms, INP {:.0}ms, CLS {:.2}",
                    p.lcp_ms, p.inp_ms, p.cls
                ),
                score,
                CORE_WEB_VITALS_MAX,
                if score >= CORE_WEB_VITALS_MAX {
                    "All Core Web Vitals pass".to_string()
                } else {
                    "One or more Core Web Vitals need improvement".to_string()
                },
            );
            if score < CORE_WEB_VITALS_MAX {
                metric = metric.with_recommendation(
                    "Bring LCP under 2.5s, INP under 200ms, and CLS under 0.1",
                );
            }
            metric
        }
        None => Metric::new(
            MetricValue::Missing,
            0.0,
            CORE_WEB_VITALS_MAX,
            "Performance data unavailable",
        )
        .with_recommendation("Re-run once the performance analyzer can reach the page"),
    };
    breakdown.push("core_web_vitals", cwv);

    // Mobile performance score
    let mobile = match perf {
        Some(p) if p.mobile_score > 0.0 => {
            let score = super::step_at_least(
                p.mobile_score,
                &[(90.0, MOBILE_PERFORMANCE_MAX), (50.0, 1.5)],
            );
            let mut metric = Metric::new(
                p.mobile_score,
                score,
                MOBILE_PERFORMANCE_MAX,
                format!("Mobile performance score {:.0}/100", p.mobile_score),
            );
            if score < MOBILE_PERFORMANCE_MAX {
                metric = metric.with_recommendation(
                    "Reduce payload and main-thread work to lift the mobile score above 90",
                );
            }
            metric
        }
        _ => Metric::new(
            MetricValue::Missing,
            0.0,
            MOBILE_PERFORMANCE_MAX,
            "Mobile performance unavailable",
        ),
    };
    breakdown.push("mobile_performance", mobile);

    // HTTPS is binary
    let ssl = if facts.https {
        Metric::new("https", SSL_MAX, SSL_MAX, "Served over HTTPS")
    } else {
        Metric::new("http", 0.0, SSL_MAX, "Not served over HTTPS")
            .with_recommendation("Serve the site over HTTPS with a valid certificate")
    };
    breakdown.push("ssl", ssl);

    // Broken links (sampled)
    let broken = match facts.broken_links {
        Some(0) => Metric::new(0u64, BROKEN_LINKS_MAX, BROKEN_LINKS_MAX, "No broken links found"),
        Some(n @ 1..=2) => Metric::new(
            n,
            1.0,
            BROKEN_LINKS_MAX,
            format!("{} broken link(s) in sample", n),
        )
        .with_recommendation("Fix or remove the broken internal links"),
        Some(n) => Metric::new(
            n,
            0.0,
            BROKEN_LINKS_MAX,
            format!("{} broken link(s) in sample", n),
        )
        .with_recommendation("Fix or remove the broken internal links"),
        None => Metric::new(MetricValue::Missing, 0.0, BROKEN_LINKS_MAX, "Links not checked"),
    };
    breakdown.push("broken_links", broken);

    breakdown.push("llms_txt", hint_file_metric(facts.llms_txt, "llms.txt", LLMS_TXT_MAX,
        "Publish an llms.txt file describing the site for AI crawlers"));
    breakdown.push("sitemap", hint_file_metric(facts.sitemap, "sitemap.xml", SITEMAP_MAX,
        "Publish a sitemap.xml listing the site's canonical URLs"));

    breakdown
}

fn hint_file_metric(status: HintFile, name: &str, max: f64, recommendation: &str) -> Metric {
    let (score, label) = match status {
        HintFile::Valid => (max, "valid"),
        HintFile::Present => (max / 2.0, "present but not well-formed"),
        HintFile::Missing => (0.0, "missing"),
    };
    let metric = Metric::new(label, score, max, format!("{} is {}", name, label));
    if score < max {
        metric.with_recommendation(recommendation)
    } else {
        metric
    }
}
