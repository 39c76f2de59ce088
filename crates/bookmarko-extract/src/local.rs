//! URL-derived metadata, the last tier of the fallback chain.
//!
//! Pure string manipulation; always produces a titled result.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use bookmarko_core::{ExtractionResult, FallbackTier, PageMetadata};

use crate::html::resolve_favicon;

static FILE_EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[A-Za-z0-9]{1,5}$").expect("valid regex"));

/// Derive metadata from a raw URL string without any network access.
pub fn derive_from_raw(raw: &str) -> ExtractionResult {
    match Url::parse(raw.trim()) {
        Ok(url) if url.host_str().is_some() => derive(&url),
        _ => minimal(raw),
    }
}

/// Title used when the input is blank.
pub const UNTITLED: &str = "Untitled";

/// The input could not be understood as a URL: it becomes the title.
pub fn minimal(raw: &str) -> ExtractionResult {
    let trimmed = raw.trim();
    let mut meta = PageMetadata::new(trimmed);
    meta.title = Some(if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    });
    ExtractionResult::Fallback(meta, FallbackTier::MinimalFallback)
}

/// Title from the hostname (or a humanized slug), description from the
/// domain and path, favicon at the conventional location.
pub fn derive(url: &Url) -> ExtractionResult {
    let Some(host) = url.host_str() else {
        return minimal(url.as_str());
    };
    let domain = host.strip_prefix("www.").unwrap_or(host).to_string();

    let title = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|seg| seg.contains('-') || seg.contains('_'))
        .map(humanize_slug)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| domain.clone());

    let path = url.path().trim_matches('/');
    let description = if path.is_empty() {
        format!("Bookmark from {}", domain)
    } else {
        format!("Bookmark from {} - {}", domain, path)
    };

    let mut meta = PageMetadata::new(url.as_str());
    meta.title = Some(title);
    meta.description = Some(description);
    // Opaque origins (custom schemes) have no favicon location.
    if url.origin().is_tuple() {
        meta.favicon = Some(resolve_favicon(url, None));
    }
    meta.domain = Some(domain);
    ExtractionResult::Fallback(meta, FallbackTier::LocalFallback)
}

/// `my-cool_article.html` -> `My Cool Article`
pub fn humanize_slug(slug: &str) -> String {
    let stem = FILE_EXTENSION_RE.replace(slug, "");
    stem.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_becomes_title() {
        let result = derive_from_raw("https://example.com/my-cool-article");
        let m = result.metadata();
        assert_eq!(result.source(), "local-fallback");
        assert_eq!(m.title.as_deref(), Some("My Cool Article"));
        assert_eq!(
            m.description.as_deref(),
            Some("Bookmark from example.com - my-cool-article")
        );
        assert_eq!(m.favicon.as_deref(), Some("https://example.com/favicon.ico"));
    }

    #[test]
    fn test_hostname_title_strips_www() {
        let result = derive_from_raw("https://www.example.org/");
        let m = result.metadata();
        assert_eq!(m.title.as_deref(), Some("example.org"));
        assert_eq!(m.description.as_deref(), Some("Bookmark from example.org"));
        assert_eq!(m.domain.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_plain_segment_keeps_hostname_title() {
        let result = derive_from_raw("https://news.example.com/articles/12345");
        let m = result.metadata();
        assert_eq!(m.title.as_deref(), Some("news.example.com"));
        assert_eq!(
            m.description.as_deref(),
            Some("Bookmark from news.example.com - articles/12345")
        );
    }

    #[test]
    fn test_humanize_strips_extension_and_mixed_separators() {
        assert_eq!(humanize_slug("getting_started-guide.html"), "Getting Started Guide");
        assert_eq!(humanize_slug("--a--"), "A");
        assert_eq!(humanize_slug("rust-2024"), "Rust 2024");
    }

    #[test]
    fn test_unparseable_input_is_minimal() {
        let result = derive_from_raw("not a url");
        assert_eq!(result.source(), "minimal-fallback");
        assert_eq!(result.title(), Some("not a url"));
        assert!(result.metadata().favicon.is_none());
        assert!(result.metadata().description.is_none());
    }

    #[test]
    fn test_hostless_url_is_minimal() {
        assert_eq!(derive_from_raw("mailto:me@example.com").source(), "minimal-fallback");
    }

    #[test]
    fn test_blank_input_is_untitled() {
        for raw in ["", "   "] {
            let result = minimal(raw);
            assert_eq!(result.title(), Some(UNTITLED));
            assert_eq!(result.metadata().url, "");
        }
    }

    #[test]
    fn test_opaque_origin_has_no_favicon() {
        let result = derive_from_raw("custom://host/release-notes");
        let m = result.metadata();
        assert_eq!(result.source(), "local-fallback");
        assert_eq!(m.title.as_deref(), Some("Release Notes"));
        assert!(m.favicon.is_none());

        let ftp = derive_from_raw("ftp://files.example.com/pub");
        assert_eq!(
            ftp.metadata().favicon.as_deref(),
            Some("ftp://files.example.com/favicon.ico")
        );
    }
}
