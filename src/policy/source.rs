// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Source tokens and origin resolution
//!
//! Classifies a single request URL into a CSP source token given the base
//! origin of the page under evaluation and a wildcard-domain table.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// One permitted source within a directive's value list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceToken {
    /// The `'self'` keyword (same origin as the page)
    SelfOrigin,
    /// A bare scheme token, e.g. `data:`
    Scheme(String),
    /// A literal origin, e.g. `https://api.example.com:8443`
    Origin(String),
    /// A generalized subdomain origin, e.g. `https://*.jsdelivr.net`
    Wildcard { scheme: String, suffix: String },
}

impl SourceToken {
    /// The `data:` scheme token
    pub fn data() -> Self {
        SourceToken::Scheme("data:".to_string())
    }

    /// Whether this token is a quoted keyword literal.
    ///
    /// Quoted literals sort before all other tokens during serialization
    /// and are never touched by normalization.
    pub fn is_keyword(&self) -> bool {
        matches!(self, SourceToken::SelfOrigin)
    }

    /// Whether a wildcard token in the same set makes this token redundant
    pub fn covered_by(&self, other: &SourceToken) -> bool {
        let SourceToken::Wildcard { scheme, suffix } = other else {
            return false;
        };
        let SourceToken::Origin(origin) = self else {
            return false;
        };
        // Compare against the exact wildcard form of this origin's host,
        // as the original filter did: scheme://*.hostname
        match Url::parse(origin) {
            Ok(u) => u.scheme() == scheme && u.host_str() == Some(suffix.as_str()),
            Err(_) => false,
        }
    }
}

impl fmt::Display for SourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceToken::SelfOrigin => f.write_str("'self'"),
            SourceToken::Scheme(s) => f.write_str(s),
            SourceToken::Origin(s) => f.write_str(s),
            SourceToken::Wildcard { scheme, suffix } => write!(f, "{}://*.{}", scheme, suffix),
        }
    }
}

/// The scheme+host+port of the page under evaluation.
///
/// Computed once at the start of a run; the reference point for `'self'`
/// classification and for base-origin redundancy elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseOrigin(String);

impl BaseOrigin {
    /// Compute the base origin from the page URL
    pub fn from_url(url: &Url) -> Self {
        BaseOrigin(url.origin().ascii_serialization())
    }

    /// Literal form, e.g. `https://example.com`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a request URL is same-origin with the page
    pub fn matches(&self, url: &Url) -> bool {
        url.origin().ascii_serialization() == self.0
    }
}

impl fmt::Display for BaseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default wildcard-eligible suffixes: CDN and analytics domains whose
/// edge nodes churn subdomains, where a `*.suffix` token keeps the policy
/// stable across renders.
const DEFAULT_WILDCARD_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "googleapis.com",
    "gstatic.com",
    "statcounter.com",
    "cloudflare.com",
    "cloudfront.net",
    "amazonaws.com",
    "akamaized.net",
    "fastly.net",
    "cdn77.org",
    "jsdelivr.net",
    "unpkg.com",
    "bootstrapcdn.com",
    "fontawesome.com",
    "fonts.gstatic.com",
    "doubleclick.net",
    "facebook.net",
    "fbcdn.net",
    "twitter.com",
    "twimg.com",
];

/// Ordered table of domain suffixes eligible for subdomain generalization.
///
/// Membership is "hostname ends with suffix"; the first matching entry
/// wins, so table order matters for ambiguous suffixes.
#[derive(Debug, Clone)]
pub struct WildcardDomains {
    suffixes: Vec<String>,
}

impl Default for WildcardDomains {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_WILDCARD_DOMAINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl WildcardDomains {
    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            suffixes: Vec::new(),
        }
    }

    /// Create a table from explicit suffixes (order preserved)
    pub fn from_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a suffix to the table
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into());
        self
    }

    /// First suffix the hostname ends with, if any
    pub fn matching_suffix(&self, hostname: &str) -> Option<&str> {
        self.suffixes
            .iter()
            .find(|s| hostname.ends_with(s.as_str()))
            .map(String::as_str)
    }

    /// Number of suffixes in the table
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

/// Resolve a request URL into a CSP source token.
///
/// Returns `None` when the URL does not parse or has no host; the caller
/// skips the event and keeps processing. Same-origin requests resolve to
/// `'self'`. With wildcards enabled, a hostname ending in a table suffix
/// generalizes to `scheme://*.suffix`, except the apex domain itself,
/// which stays literal.
pub fn resolve_origin(
    request_url: &str,
    base: &BaseOrigin,
    table: &WildcardDomains,
    wildcards_enabled: bool,
) -> Option<SourceToken> {
    let url = Url::parse(request_url).ok()?;
    let hostname = url.host_str()?.to_string();

    if base.matches(&url) {
        return Some(SourceToken::SelfOrigin);
    }

    if wildcards_enabled {
        if let Some(suffix) = table.matching_suffix(&hostname) {
            if hostname == suffix {
                return Some(SourceToken::Origin(format!(
                    "{}://{}",
                    url.scheme(),
                    hostname
                )));
            }
            return Some(SourceToken::Wildcard {
                scheme: url.scheme().to_string(),
                suffix: suffix.to_string(),
            });
        }
    }

    Some(SourceToken::Origin(url.origin().ascii_serialization()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseOrigin {
        BaseOrigin::from_url(&Url::parse("https://example.com").unwrap())
    }

    #[test]
    fn test_same_origin_is_self() {
        let token = resolve_origin(
            "https://example.com/app.js",
            &base(),
            &WildcardDomains::default(),
            true,
        );
        assert_eq!(token, Some(SourceToken::SelfOrigin));
    }

    #[test]
    fn test_same_host_different_scheme_is_not_self() {
        let token = resolve_origin(
            "http://example.com/app.js",
            &base(),
            &WildcardDomains::empty(),
            true,
        );
        assert_eq!(
            token,
            Some(SourceToken::Origin("http://example.com".to_string()))
        );
    }

    #[test]
    fn test_subdomain_generalizes_to_wildcard() {
        let token = resolve_origin(
            "https://cdn.jsdelivr.net/lib.js",
            &base(),
            &WildcardDomains::default(),
            true,
        );
        assert_eq!(
            token,
            Some(SourceToken::Wildcard {
                scheme: "https".to_string(),
                suffix: "jsdelivr.net".to_string(),
            })
        );
        assert_eq!(token.unwrap().to_string(), "https://*.jsdelivr.net");
    }

    #[test]
    fn test_apex_domain_stays_literal() {
        let token = resolve_origin(
            "https://jsdelivr.net/lib.js",
            &base(),
            &WildcardDomains::default(),
            true,
        );
        assert_eq!(
            token,
            Some(SourceToken::Origin("https://jsdelivr.net".to_string()))
        );
    }

    #[test]
    fn test_wildcards_disabled_keeps_literal_origin() {
        let token = resolve_origin(
            "https://cdn.jsdelivr.net/lib.js",
            &base(),
            &WildcardDomains::default(),
            false,
        );
        assert_eq!(
            token,
            Some(SourceToken::Origin("https://cdn.jsdelivr.net".to_string()))
        );
    }

    #[test]
    fn test_unparsable_url_skipped() {
        assert_eq!(
            resolve_origin("not a url", &base(), &WildcardDomains::default(), true),
            None
        );
        assert_eq!(
            resolve_origin("", &base(), &WildcardDomains::default(), true),
            None
        );
    }

    #[test]
    fn test_hostless_url_skipped() {
        assert_eq!(
            resolve_origin("about:blank", &base(), &WildcardDomains::default(), true),
            None
        );
    }

    #[test]
    fn test_non_default_port_kept() {
        let token = resolve_origin(
            "https://api.example.org:8443/v1",
            &base(),
            &WildcardDomains::empty(),
            true,
        );
        assert_eq!(
            token,
            Some(SourceToken::Origin(
                "https://api.example.org:8443".to_string()
            ))
        );
    }

    #[test]
    fn test_synthetic_table_first_match_wins() {
        let table = WildcardDomains::from_suffixes(["assets.test", "test"]);
        let token = resolve_origin(
            "https://img.assets.test/x.png",
            &base(),
            &table,
            true,
        );
        assert_eq!(
            token,
            Some(SourceToken::Wildcard {
                scheme: "https".to_string(),
                suffix: "assets.test".to_string(),
            })
        );
    }

    #[test]
    fn test_covered_by_wildcard() {
        let specific = SourceToken::Origin("https://jsdelivr.net".to_string());
        let wildcard = SourceToken::Wildcard {
            scheme: "https".to_string(),
            suffix: "jsdelivr.net".to_string(),
        };
        assert!(specific.covered_by(&wildcard));

        let unrelated = SourceToken::Origin("https://unpkg.com".to_string());
        assert!(!unrelated.covered_by(&wildcard));

        // Scheme must match too
        let http_specific = SourceToken::Origin("http://jsdelivr.net".to_string());
        assert!(!http_specific.covered_by(&wildcard));
    }
}
