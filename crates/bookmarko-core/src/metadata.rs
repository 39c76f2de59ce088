//! Page metadata and the tagged extraction result.
//!
//! Extraction runs through an ordered chain of tiers. The result records
//! which tier produced it; the JSON form flattens the page fields and adds a
//! `metadata: {source, url, domain?}` envelope.

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

/// Source label of the primary (direct page fetch) tier.
pub const SOURCE_PAGE_FETCH: &str = "page-fetch";

/// Fields extracted from a page or derived from its URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMetadata {
    /// The URL the metadata describes.
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Absolute favicon URL.
    pub favicon: Option<String>,
    /// Hostname, when known.
    pub domain: Option<String>,
    /// `og_*` and `twitter_*` properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl PageMetadata {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// A result without a non-blank title is unusable and falls through to
    /// the next tier.
    pub fn is_usable(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Non-primary tiers of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackTier {
    /// Alternate hosted extraction endpoint.
    RemoteFunction,
    /// Metadata derived locally from a parseable URL.
    LocalFallback,
    /// The input was not a URL; the raw string is the title.
    MinimalFallback,
}

impl FallbackTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackTier::RemoteFunction => "remote-function",
            FallbackTier::LocalFallback => "local-fallback",
            FallbackTier::MinimalFallback => "minimal-fallback",
        }
    }
}

impl std::fmt::Display for FallbackTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of metadata extraction. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Primary(PageMetadata),
    Fallback(PageMetadata, FallbackTier),
}

impl ExtractionResult {
    pub fn metadata(&self) -> &PageMetadata {
        match self {
            ExtractionResult::Primary(m) | ExtractionResult::Fallback(m, _) => m,
        }
    }

    pub fn into_metadata(self) -> PageMetadata {
        match self {
            ExtractionResult::Primary(m) | ExtractionResult::Fallback(m, _) => m,
        }
    }

    /// Label of the tier that produced this result.
    pub fn source(&self) -> &'static str {
        match self {
            ExtractionResult::Primary(_) => SOURCE_PAGE_FETCH,
            ExtractionResult::Fallback(_, tier) => tier.as_str(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ExtractionResult::Fallback(..))
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata().title.as_deref()
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serializing string-keyed maps of strings cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(serde::Serialize)]
struct WireSource<'a> {
    source: &'static str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

#[derive(serde::Serialize)]
struct WireResult<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    favicon: Option<&'a str>,
    #[serde(flatten)]
    properties: &'a BTreeMap<String, String>,
    metadata: WireSource<'a>,
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let m = self.metadata();
        WireResult {
            title: m.title.as_deref(),
            description: m.description.as_deref(),
            favicon: m.favicon.as_deref(),
            properties: &m.properties,
            metadata: WireSource {
                source: self.source(),
                url: &m.url,
                domain: m.domain.as_deref(),
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageMetadata {
        let mut m = PageMetadata::new("https://example.com/a");
        m.title = Some("Example".into());
        m.favicon = Some("https://example.com/favicon.ico".into());
        m.properties
            .insert("og_image".into(), "https://example.com/i.png".into());
        m
    }

    #[test]
    fn test_primary_serializes_flat_with_source() {
        let json = serde_json::to_value(ExtractionResult::Primary(page())).unwrap();
        assert_eq!(json["title"], "Example");
        assert_eq!(json["og_image"], "https://example.com/i.png");
        assert_eq!(json["metadata"]["source"], "page-fetch");
        assert_eq!(json["metadata"]["url"], "https://example.com/a");
        assert!(json.get("description").is_none());
        assert!(json["metadata"].get("domain").is_none());
    }

    #[test]
    fn test_fallback_source_labels() {
        for (tier, label) in [
            (FallbackTier::RemoteFunction, "remote-function"),
            (FallbackTier::LocalFallback, "local-fallback"),
            (FallbackTier::MinimalFallback, "minimal-fallback"),
        ] {
            let r = ExtractionResult::Fallback(page(), tier);
            assert!(r.is_fallback());
            assert_eq!(r.to_json()["metadata"]["source"], label);
        }
    }

    #[test]
    fn test_usable_requires_title() {
        let mut m = PageMetadata::new("https://a.com");
        assert!(!m.is_usable());
        m.title = Some("   ".into());
        assert!(!m.is_usable());
        m.title = Some("A".into());
        assert!(m.is_usable());
    }
}
