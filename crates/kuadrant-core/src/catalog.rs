//! `kuadrant://` documentation resources.
//!
//! Most resources map to a markdown file in one of the Kuadrant GitHub
//! repositories. The core policy references carry a compact built-in fallback
//! so they stay readable when GitHub is unreachable; the other remote ones
//! fail hard. Guides with no upstream counterpart (PlanPolicy, the worked
//! examples, troubleshooting) are built in and never fetched.

use crate::docs::DocCache;
use crate::error::Result;

/// Raw-content root the source paths are resolved against.
pub const DEFAULT_DOCS_BASE_URL: &str = "https://raw.githubusercontent.com/Kuadrant";

pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// Rewrite applied to fetched (or fallback) content before it is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTransform {
    None,
    /// Authorino docs speak of `AuthConfig`; in Kuadrant the equivalent is `AuthPolicy`.
    AuthorinoToKuadrant,
}

impl DocTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            DocTransform::None => text.to_string(),
            DocTransform::AuthorinoToKuadrant => {
                let text = collapse_blank_lines(&strip_html_comments(text));
                text.replace("AuthConfig", "AuthPolicy")
                    .replace("authconfig", "authpolicy")
                    .replace("AuthPolicyConfig", "AuthPolicy")
            }
        }
    }
}

/// One readable documentation resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocSource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Path below the docs base URL. `None` for built-in documents.
    pub path: Option<&'static str>,
    /// Served when the fetch fails, and always for built-in documents. Empty
    /// means a failed fetch fails the read.
    pub fallback: &'static str,
    pub transform: DocTransform,
}

const SOURCES: &[DocSource] = &[
    DocSource {
        uri: "kuadrant://docs/gateway-api",
        name: "Gateway API Overview",
        description: "Overview of Gateway API and Kuadrant integration",
        path: Some("kuadrant-operator/main/doc/overviews/gateway-api.md"),
        fallback: include_str!("../docs/fallback/gateway-api.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/dnspolicy",
        name: "DNSPolicy Reference",
        description: "Complete DNSPolicy specification and examples",
        path: Some("kuadrant-operator/main/doc/reference/dnspolicy.md"),
        fallback: include_str!("../docs/fallback/dnspolicy.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/ratelimitpolicy",
        name: "RateLimitPolicy Reference",
        description: "Complete RateLimitPolicy specification and examples",
        path: Some("kuadrant-operator/main/doc/reference/ratelimitpolicy.md"),
        fallback: include_str!("../docs/fallback/ratelimitpolicy.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/authpolicy",
        name: "AuthPolicy Reference",
        description: "Complete AuthPolicy specification and examples",
        path: Some("kuadrant-operator/main/doc/reference/authpolicy.md"),
        fallback: include_str!("../docs/fallback/authpolicy.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/tlspolicy",
        name: "TLSPolicy Reference",
        description: "Complete TLSPolicy specification and examples",
        path: Some("kuadrant-operator/main/doc/reference/tlspolicy.md"),
        fallback: include_str!("../docs/fallback/tlspolicy.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/tokenratelimitpolicy",
        name: "TokenRateLimitPolicy Reference",
        description: "Token-based rate limiting for AI/LLM services",
        path: Some("kuadrant-operator/main/doc/reference/tokenratelimitpolicy.md"),
        fallback: "",
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/kuadrant",
        name: "Kuadrant CR Reference",
        description: "Main Kuadrant custom resource configuration",
        path: Some("kuadrant-operator/main/doc/reference/kuadrant.md"),
        fallback: "",
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/telemetrypolicy",
        name: "TelemetryPolicy Reference",
        description: "Custom metrics labels for Gateway API resources",
        path: Some("kuadrant-operator/main/doc/reference/telemetrypolicy.md"),
        fallback: "",
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://docs/authorino-features",
        name: "Authorino Features",
        description: "Complete guide to Authorino authentication and authorization features",
        path: Some("authorino/main/docs/features.md"),
        fallback: "",
        transform: DocTransform::AuthorinoToKuadrant,
    },
    DocSource {
        uri: "kuadrant://docs/planpolicy",
        name: "PlanPolicy Extension",
        description: "Plan-based rate limiting for tiered service offerings",
        path: None,
        fallback: include_str!("../docs/builtin/planpolicy.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://examples/basic-setup",
        name: "Basic API Setup Example",
        description: "Complete example of basic API with rate limiting and auth",
        path: None,
        fallback: include_str!("../docs/builtin/basic-setup.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://examples/production-setup",
        name: "Production API Setup Example",
        description: "Full production setup with TLS, DNS, and advanced policies",
        path: None,
        fallback: include_str!("../docs/builtin/production-setup.md"),
        transform: DocTransform::None,
    },
    DocSource {
        uri: "kuadrant://troubleshooting",
        name: "Troubleshooting Guide",
        description: "Common issues and debugging techniques for Kuadrant",
        path: None,
        fallback: include_str!("../docs/builtin/troubleshooting.md"),
        transform: DocTransform::None,
    },
];

/// Resolves resource URIs to source URLs under a configurable base.
#[derive(Debug, Clone)]
pub struct Catalog {
    base_url: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_BASE_URL)
    }
}

impl Catalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sources(&self) -> &'static [DocSource] {
        SOURCES
    }

    pub fn get(&self, uri: &str) -> Option<&'static DocSource> {
        SOURCES.iter().find(|s| s.uri == uri)
    }

    /// Remote location of `source`, or `None` if it is built in.
    pub fn source_url(&self, source: &DocSource) -> Option<String> {
        source.path.map(|path| format!("{}/{}", self.base_url, path))
    }

    /// Produce the served text for `source`: cache lookup, then the transform.
    /// Built-in documents skip the cache.
    pub async fn read(&self, cache: &DocCache, source: &DocSource) -> Result<String> {
        let Some(url) = self.source_url(source) else {
            return Ok(source.transform.apply(source.fallback));
        };
        let raw = cache.fetch(&url, source.fallback).await?;
        Ok(source.transform.apply(&raw))
    }
}

fn strip_html_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => {
                // Unterminated comment: leave it as written.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Three or more consecutive newlines become two.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;

    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::testing::{ManualClock, ScriptedFetcher};
    use crate::docs::DocCacheConfig;
    use crate::error::DocsError;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn make_cache(fetcher: Arc<ScriptedFetcher>) -> DocCache {
        DocCache::new(DocCacheConfig::default(), fetcher).with_clock(Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_uris_unique_and_scheme() {
        let catalog = Catalog::default();
        let uris: HashSet<&str> = catalog.sources().iter().map(|s| s.uri).collect();
        assert_eq!(uris.len(), catalog.sources().len());
        assert!(uris.iter().all(|u| u.starts_with("kuadrant://")));
    }

    #[test]
    fn test_core_policies_have_fallbacks() {
        let catalog = Catalog::default();
        for uri in [
            "kuadrant://docs/gateway-api",
            "kuadrant://docs/dnspolicy",
            "kuadrant://docs/ratelimitpolicy",
            "kuadrant://docs/authpolicy",
            "kuadrant://docs/tlspolicy",
        ] {
            let source = catalog.get(uri).unwrap();
            assert!(!source.fallback.is_empty(), "{uri} should have a fallback");
        }
        assert!(catalog
            .get("kuadrant://docs/authorino-features")
            .unwrap()
            .fallback
            .is_empty());
    }

    #[test]
    fn test_source_url_trims_trailing_slash() {
        let catalog = Catalog::new("http://127.0.0.1:8080/docs/");
        let source = catalog.get("kuadrant://docs/dnspolicy").unwrap();
        assert_eq!(
            catalog.source_url(source).unwrap(),
            "http://127.0.0.1:8080/docs/kuadrant-operator/main/doc/reference/dnspolicy.md"
        );
    }

    #[test]
    fn test_unknown_uri() {
        assert!(Catalog::default().get("kuadrant://docs/nope").is_none());
    }

    #[test]
    fn test_authorino_transform() {
        let input = "# AuthConfig\n\n\n\n<!-- nav -->An authconfig refers to AuthConfigs.\n<!--\nmulti\nline\n-->done";
        let output = DocTransform::AuthorinoToKuadrant.apply(input);
        assert_eq!(
            output,
            "# AuthPolicy\n\nAn authpolicy refers to AuthPolicys.\ndone"
        );
    }

    #[test]
    fn test_unterminated_comment_kept() {
        assert_eq!(strip_html_comments("a <!-- b"), "a <!-- b");
    }

    #[test]
    fn test_none_transform_is_identity() {
        let text = "line\n\n\n\n<!-- kept -->";
        assert_eq!(DocTransform::None.apply(text), text);
    }

    #[tokio::test]
    async fn test_read_serves_remote_content() {
        let catalog = Catalog::new("https://docs.test");
        let source = catalog.get("kuadrant://docs/dnspolicy").unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&catalog.source_url(source).unwrap(), "# Remote DNSPolicy");
        let cache = make_cache(fetcher);

        let text = catalog.read(&cache, source).await.unwrap();
        assert_eq!(text, "# Remote DNSPolicy");
    }

    #[tokio::test]
    async fn test_read_falls_back_when_remote_down() {
        let catalog = Catalog::new("https://docs.test");
        let source = catalog.get("kuadrant://docs/tlspolicy").unwrap();
        let cache = make_cache(Arc::new(ScriptedFetcher::new()));

        let text = catalog.read(&cache, source).await.unwrap();
        assert!(text.starts_with("# TLSPolicy"));
    }

    #[tokio::test]
    async fn test_read_without_fallback_fails() {
        let catalog = Catalog::new("https://docs.test");
        let source = catalog.get("kuadrant://docs/kuadrant").unwrap();
        let cache = make_cache(Arc::new(ScriptedFetcher::new()));

        let err = catalog.read(&cache, source).await.unwrap_err();
        let DocsError::FetchFailed { url, .. } = err;
        assert_eq!(Some(url), catalog.source_url(source));
    }

    #[tokio::test]
    async fn test_read_caches_raw_text() {
        let catalog = Catalog::new("https://docs.test");
        let source = catalog.get("kuadrant://docs/authorino-features").unwrap();
        let url = catalog.source_url(source).unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.respond(&url, "AuthConfig");
        let cache = make_cache(fetcher);

        assert_eq!(catalog.read(&cache, source).await.unwrap(), "AuthPolicy");
        assert_eq!(cache.entry(&url).await.unwrap().content, "AuthConfig");
    }

    #[test]
    fn test_builtin_guides_listed() {
        let catalog = Catalog::default();
        assert_eq!(catalog.sources().len(), 13);
        for uri in [
            "kuadrant://docs/planpolicy",
            "kuadrant://examples/basic-setup",
            "kuadrant://examples/production-setup",
            "kuadrant://troubleshooting",
        ] {
            let source = catalog.get(uri).unwrap();
            assert!(catalog.source_url(source).is_none(), "{uri} is built in");
            assert!(source.fallback.starts_with("# "), "{uri} needs content");
        }
        assert_eq!(
            catalog.get("kuadrant://docs/planpolicy").unwrap().name,
            "PlanPolicy Extension"
        );
    }

    #[tokio::test]
    async fn test_read_builtin_never_fetches() {
        let catalog = Catalog::new("https://docs.test");
        let source = catalog.get("kuadrant://examples/basic-setup").unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new());
        let cache = make_cache(fetcher.clone());

        let text = catalog.read(&cache, source).await.unwrap();
        assert_eq!(text, source.fallback);
        assert!(text.contains("kind: RateLimitPolicy"));
        assert_eq!(fetcher.total_calls(), 0);
        assert_eq!(cache.stats().await.entries, 0);
    }
}
