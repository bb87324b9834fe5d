//! HTTP page inspector
//!
//! Fetches a page and extracts the structural facts the scoring engine
//! consumes: heading counts, JSON-LD schema types, media and link
//! counts, word count, leading text, author/citation/local signals.
//! Also probes the site's `llms.txt` and `sitemap.xml` hint files and
//! samples a handful of internal links for breakage.
//!
//! Parsing is done synchronously on the fetched body (the parsed DOM is
//! not held across awaits); the follow-up probes run afterwards.

use crate::types::{HintFile, PageFacts, PageInspector, ProviderError};
use beacon_common::urls::domain_of;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for page fetches
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Internal links sampled for breakage per page
const BROKEN_LINK_SAMPLE: usize = 10;

/// Concurrent probes while sampling links
const PROBE_CONCURRENCY: usize = 4;

/// Words considered for the sentiment hint
const SENTIMENT_SAMPLE_WORDS: usize = 400;

static HEADING_SELECTORS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    ["h1", "h2", "h3", "h4", "h5", "h6"]
        .map(|tag| Selector::parse(tag).expect("Failed to parse heading selector"))
});

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']")
        .expect("Failed to parse JSON-LD selector")
});

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("Failed to parse img selector"));

static VIDEO_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("video, iframe[src*='youtube'], iframe[src*='vimeo']")
        .expect("Failed to parse video selector")
});

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Failed to parse table selector"));

static LIST_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul, ol").expect("Failed to parse list selector"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to parse anchor selector"));

static TEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, h1, h2, h3, h4, h5, h6, li, td, blockquote")
        .expect("Failed to parse text selector")
});

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("Failed to parse paragraph selector"));

/// Positive/negative marker words for the sentiment hint
const POSITIVE_WORDS: &[&str] = &[
    "best", "trusted", "easy", "love", "great", "reliable", "expert", "proven", "excellent",
    "helpful", "quality", "recommended",
];
const NEGATIVE_WORDS: &[&str] = &[
    "scam", "worst", "broken", "terrible", "hate", "spam", "useless", "awful",
];

/// HTTP page inspector
pub struct HttpPageInspector {
    http_client: Client,
    sample_size: usize,
}

impl HttpPageInspector {
    pub fn new() -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .user_agent(concat!("beacon-engine/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            sample_size: BROKEN_LINK_SAMPLE,
        }
    }

    /// Override the broken-link sample size (0 disables sampling)
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Probe a hint file and classify it as Missing/Present/Valid
    async fn probe_hint_file(&self, url: Url, validate: fn(&str) -> bool) -> HintFile {
        let response = match self.http_client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url = %url, "hint file probe failed: {}", e);
                return HintFile::Missing;
            }
        };
        if !response.status().is_success() {
            return HintFile::Missing;
        }
        match response.text().await {
            Ok(body) if !body.trim().is_empty() => {
                if validate(&body) {
                    HintFile::Valid
                } else {
                    HintFile::Present
                }
            }
            _ => HintFile::Missing,
        }
    }

    /// HEAD-probe a sample of internal links; unreachable or 4xx/5xx
    /// links count as broken
    async fn sample_broken_links(&self, links: &[Url]) -> u32 {
        let sample: Vec<Url> = links.iter().take(self.sample_size).cloned().collect();
        stream::iter(sample)
            .map(|link| {
                let client = self.http_client.clone();
                async move {
                    match client.head(link).send().await {
                        Ok(response) => !response.status().is_success(),
                        Err(_) => true,
                    }
                }
            })
            .buffer_unordered(PROBE_CONCURRENCY)
            .filter(|broken| futures::future::ready(*broken))
            .count()
            .await as u32
    }
}

impl Default for HttpPageInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageInspector for HttpPageInspector {
    async fn inspect(&self, url: &Url) -> Result<PageFacts, ProviderError> {
        debug!(url = %url, "inspecting page");

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("page fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "page fetch returned {}",
                response.status()
            )));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("page body read failed: {}", e)))?;

        let (mut facts, internal_links) = extract_facts(&body, &final_url);
        facts.url = url.to_string();
        facts.https = final_url.scheme() == "https";

        let origin = {
            let mut o = final_url.clone();
            o.set_path("/");
            o.set_query(None);
            o.set_fragment(None);
            o
        };
        if let Ok(llms_url) = origin.join("llms.txt") {
            facts.llms_txt = self
                .probe_hint_file(llms_url, |body| body.trim_start().starts_with('#'))
                .await;
        }
        if let Ok(sitemap_url) = origin.join("sitemap.xml") {
            facts.sitemap = self
                .probe_hint_file(sitemap_url, |body| {
                    body.contains("<urlset") || body.contains("<sitemapindex")
                })
                .await;
        }

        if self.sample_size > 0 {
            facts.broken_links = Some(self.sample_broken_links(&internal_links).await);
        }

        debug!(
            url = %url,
            word_count = facts.word_count,
            schema_types = facts.schema_types.len(),
            internal_links = facts.internal_links,
            "page inspection complete"
        );
        Ok(facts)
    }
}

/// Extract structural facts from an HTML body
///
/// Synchronous: the parsed document never crosses an await point.
/// Returns the facts plus the resolved internal link URLs for sampling.
fn extract_facts(body: &str, base: &Url) -> (PageFacts, Vec<Url>) {
    let document = Html::parse_document(body);
    let mut facts = PageFacts::default();

    for (i, selector) in HEADING_SELECTORS.iter().enumerate() {
        let count = document.select(selector).count() as u32;
        match i {
            0 => facts.headings.h1 = count,
            1 => facts.headings.h2 = count,
            2 => facts.headings.h3 = count,
            3 => facts.headings.h4 = count,
            4 => facts.headings.h5 = count,
            _ => facts.headings.h6 = count,
        }
    }

    // Visible text approximation: content-bearing elements only, so
    // script and style bodies never inflate the word count.
    let text: String = document
        .select(&TEXT_SELECTOR)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ");
    let words: Vec<&str> = text.split_whitespace().collect();
    facts.word_count = words.len() as u32;
    facts.sentiment_hint = sentiment_hint(&words);

    facts.leading_text = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| {
            words
                .iter()
                .take(50)
                .copied()
                .collect::<Vec<_>>()
                .join(" ")
        });

    for script in document.select(&JSON_LD_SELECTOR) {
        let raw = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            collect_schema_signals(&value, &mut facts);
        }
    }
    facts.schema_types.sort();
    facts.schema_types.dedup();

    for img in document.select(&IMG_SELECTOR) {
        facts.images += 1;
        if img
            .value()
            .attr("alt")
            .is_some_and(|alt| alt.trim().len() >= 5)
        {
            facts.images_with_alt += 1;
        }
    }
    facts.videos = document.select(&VIDEO_SELECTOR).count() as u32;
    facts.tables = document.select(&TABLE_SELECTOR).count() as u32;
    facts.lists = document.select(&LIST_SELECTOR).count() as u32;

    let page_domain = domain_of(base);
    let mut internal_links = Vec::new();
    let mut external_hosts = HashSet::new();
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or_default();
        if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:") {
            continue;
        }
        let Ok(link) = base.join(href) else { continue };
        if !matches!(link.scheme(), "http" | "https") {
            continue;
        }
        if domain_of(&link) == page_domain {
            facts.internal_links += 1;
            internal_links.push(link);
        } else {
            facts.external_links += 1;
            external_hosts.insert(domain_of(&link));
        }
    }
    facts.citation_count = external_hosts.len() as u32;

    (facts, internal_links)
}

/// Walk a JSON-LD document collecting schema types and trust signals
fn collect_schema_signals(value: &serde_json::Value, facts: &mut PageFacts) {
    match value {
        serde_json::Value::Object(map) => {
            match map.get("@type") {
                Some(serde_json::Value::String(t)) => facts.schema_types.push(t.clone()),
                Some(serde_json::Value::Array(types)) => {
                    for t in types.iter().filter_map(|t| t.as_str()) {
                        facts.schema_types.push(t.to_string());
                    }
                }
                _ => {}
            }
            if map.contains_key("author") {
                facts.has_author_schema = true;
            }
            if map.contains_key("address") {
                facts.has_local_signals = true;
            }
            for nested in map.values() {
                collect_schema_signals(nested, facts);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_schema_signals(item, facts);
            }
        }
        _ => {}
    }

    if facts
        .schema_types
        .iter()
        .any(|t| t == "LocalBusiness" || t == "PostalAddress" || t.ends_with("LocalBusiness"))
    {
        facts.has_local_signals = true;
    }
    if facts.schema_types.iter().any(|t| t == "Person") {
        facts.has_author_schema = true;
    }
}

/// Lexicon-based sentiment hint over the leading words, 0.0-1.0
fn sentiment_hint(words: &[&str]) -> f64 {
    let mut positive = 0i32;
    let mut negative = 0i32;
    for word in words.iter().take(SENTIMENT_SAMPLE_WORDS) {
        let w = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_lowercase();
        if POSITIVE_WORDS.contains(&w.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&w.as_str()) {
            negative += 1;
        }
    }
    (0.5 + 0.06 * positive as f64 - 0.08 * negative as f64).clamp(0.0, 1.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r##"<!DOCTYPE html>
<html><head>
<script type="application/ld+json">
{"@context": "https://schema.org", "@type": "Article",
 "author": {"@type": "Person", "name": "Jo Field"}}
</script>
</head><body>
<h1>Widget cleaning guide</h1>
<p>Widget cleaning takes five minutes with household tools and keeps bearings smooth.</p>
<h2>Steps</h2>
<ul><li>Remove the cover</li><li>Wipe the rail</li></ul>
<h2>Reference</h2>
<table><tr><td>Step</td><td>Time</td></tr></table>
<img src="a.png" alt="disassembled widget on a towel">
<img src="b.png">
<a href="/about">About</a>
<a href="https://other.example.net/source">Source</a>
<a href="#top">Top</a>
</body></html>"##;

    fn sample_facts() -> PageFacts {
        let base = Url::parse("https://example.com/guide").unwrap();
        extract_facts(SAMPLE_PAGE, &base).0
    }

    #[test]
    fn test_heading_counts() {
        let facts = sample_facts();
        assert_eq!(facts.headings.h1, 1);
        assert_eq!(facts.headings.h2, 2);
        assert!(!facts.headings.has_level_skip());
    }

    #[test]
    fn test_schema_types_and_author() {
        let facts = sample_facts();
        assert!(facts.schema_types.contains(&"Article".to_string()));
        assert!(facts.schema_types.contains(&"Person".to_string()));
        assert!(facts.has_author_schema);
        assert!(!facts.has_local_signals);
    }

    #[test]
    fn test_media_and_structure_counts() {
        let facts = sample_facts();
        assert_eq!(facts.images, 2);
        assert_eq!(facts.images_with_alt, 1);
        assert_eq!(facts.tables, 1);
        assert_eq!(facts.lists, 1);
        assert_eq!(facts.videos, 0);
    }

    #[test]
    fn test_link_classification() {
        let facts = sample_facts();
        assert_eq!(facts.internal_links, 1);
        assert_eq!(facts.external_links, 1);
        assert_eq!(facts.citation_count, 1);
    }

    #[test]
    fn test_leading_text_is_first_paragraph() {
        let facts = sample_facts();
        assert!(facts.leading_text.starts_with("Widget cleaning takes"));
    }

    #[test]
    fn test_word_count_excludes_script_bodies() {
        let facts = sample_facts();
        // The JSON-LD payload must not count as page text.
        assert!(facts.word_count < 40, "got {}", facts.word_count);
        assert!(facts.word_count > 15);
    }

    #[test]
    fn test_sentiment_hint_neutral_and_clamped() {
        assert_eq!(sentiment_hint(&[]), 0.5);
        let negative = vec!["scam"; 100];
        assert_eq!(sentiment_hint(&negative), 0.0);
        let positive = vec!["great"; 100];
        assert_eq!(sentiment_hint(&positive), 1.0);
    }

    #[test]
    fn test_local_business_schema_sets_local_signals() {
        let base = Url::parse("https://example.com/").unwrap();
        let page = r#"<html><head><script type="application/ld+json">
            {"@type": "LocalBusiness", "address": {"@type": "PostalAddress"}}
        </script></head><body></body></html>"#;
        let (facts, _) = extract_facts(page, &base);
        assert!(facts.has_local_signals);
    }
}
