//! Regex-based HTML field extraction.
//!
//! No DOM is built: each field is matched with a pattern over the raw
//! document, which tolerates broken markup.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use bookmarko_core::PageMetadata;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*name=["']description["'][^>]*content=["'](.*?)["'][^>]*>"#)
        .expect("valid regex")
});

static DESCRIPTION_REVERSED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*content=["'](.*?)["'][^>]*name=["']description["'][^>]*>"#)
        .expect("valid regex")
});

static FAVICON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link[^>]*rel=["'](?:shortcut )?icon["'][^>]*href=["'](.*?)["'][^>]*>"#)
        .expect("valid regex")
});

static FAVICON_REVERSED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link[^>]*href=["'](.*?)["'][^>]*rel=["'](?:shortcut )?icon["'][^>]*>"#)
        .expect("valid regex")
});

static OG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*property=["']og:([^"']+)["'][^>]*content=["'](.*?)["'][^>]*>"#)
        .expect("valid regex")
});

static TWITTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta[^>]*name=["']twitter:([^"']+)["'][^>]*content=["'](.*?)["'][^>]*>"#)
        .expect("valid regex")
});

static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9A-Fa-f]{1,6})|([0-9]{1,7}));").expect("valid regex"));

/// Extract metadata fields from a fetched page.
pub fn extract_page_metadata(html: &str, page_url: &Url) -> PageMetadata {
    let mut meta = PageMetadata::new(page_url.as_str());
    meta.domain = page_url.host_str().map(str::to_owned);
    meta.title = first_capture(&TITLE_RE, html);

    for (re, prefix) in [(&*OG_RE, "og_"), (&*TWITTER_RE, "twitter_")] {
        for caps in re.captures_iter(html) {
            let value = clean(&caps[2]);
            if value.is_empty() {
                continue;
            }
            // A repeated key keeps the last value.
            meta.properties
                .insert(format!("{}{}", prefix, caps[1].trim()), value);
        }
    }

    meta.description = first_capture(&DESCRIPTION_RE, html)
        .or_else(|| first_capture(&DESCRIPTION_REVERSED_RE, html))
        .or_else(|| meta.properties.get("og_description").cloned());

    let href = first_capture(&FAVICON_RE, html).or_else(|| first_capture(&FAVICON_REVERSED_RE, html));
    meta.favicon = Some(resolve_favicon(page_url, href.as_deref()));

    meta
}

/// Make a favicon `href` absolute against the page origin.
///
/// - `//host/x` takes the page scheme
/// - `/x` becomes `{origin}/x`
/// - `http...` is kept as is
/// - any other relative `x` becomes `{origin}/x`
/// - a missing href becomes `{origin}/favicon.ico`
pub fn resolve_favicon(page_url: &Url, href: Option<&str>) -> String {
    let origin = page_url.origin().ascii_serialization();
    match href.map(str::trim).filter(|h| !h.is_empty()) {
        None => format!("{}/favicon.ico", origin),
        Some(h) if h.starts_with("//") => format!("{}:{}", page_url.scheme(), h),
        Some(h) if h.starts_with('/') => format!("{}{}", origin, h),
        Some(h) if h.starts_with("http") => h.to_string(),
        Some(h) => format!("{}/{}", origin, h),
    }
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .map(|caps| clean(&caps[1]))
        .filter(|s| !s.is_empty())
}

/// Collapse whitespace and decode numeric references plus the named
/// entities common in `<title>` and attribute values.
fn clean(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&collapsed, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
