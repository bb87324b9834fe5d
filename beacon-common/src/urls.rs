//! URL normalization helpers
//!
//! Callers supply bare hosts ("example.com") or full URLs. Normalization
//! defaults the scheme to `https://` and rejects entries without a valid
//! host. Malformed entries are dropped from batches, never fatal.

use crate::{Error, Result};
use url::Url;

/// Normalize a caller-supplied URL or bare host string
///
/// - Prepends `https://` when no scheme is present
/// - Rejects non-http(s) schemes and host-less URLs
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| Error::InvalidInput(format!("malformed URL '{}': {}", input, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported scheme '{}' in '{}'",
                other, input
            )))
        }
    }

    if parsed.host_str().map_or(true, |h| h.is_empty()) {
        return Err(Error::InvalidInput(format!("no host in '{}'", input)));
    }

    Ok(parsed)
}

/// Registrable domain of a URL, without a leading `www.`
pub fn domain_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Brand stem of a domain: the leftmost label ("acme" for "acme.co.uk")
///
/// Used to match brand keywords against ranked-keyword rows.
pub fn brand_stem(domain: &str) -> String {
    domain
        .split('.')
        .next()
        .unwrap_or(domain)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_gets_https() {
        let url = normalize_url("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_existing_scheme_preserved() {
        let url = normalize_url("http://example.com/page").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.path(), "/page");
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(normalize_url("").is_err());
        assert!(normalize_url("   ").is_err());
        assert!(normalize_url("http://").is_err());
        assert!(normalize_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_domain_strips_www() {
        let url = normalize_url("www.example.com").unwrap();
        assert_eq!(domain_of(&url), "example.com");
    }

    #[test]
    fn test_brand_stem() {
        assert_eq!(brand_stem("acme.co.uk"), "acme");
        assert_eq!(brand_stem("example.com"), "example");
        assert_eq!(brand_stem("localhost"), "localhost");
    }
}
