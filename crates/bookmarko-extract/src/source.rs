//! Fetching tiers of the metadata chain.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use bookmarko_core::PageMetadata;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::html::extract_page_metadata;

/// A tier that can produce metadata for a URL over the network.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &Url) -> ExtractResult<PageMetadata>;
}

/// Build the shared HTTP client used by both fetching tiers.
pub fn build_client(config: &ExtractorConfig) -> ExtractResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ExtractError::Client(e.to_string()))
}

fn expect_ok(status: StatusCode, url: &str) -> ExtractResult<()> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(ExtractError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

// =============================================================================
// PAGE FETCH
// =============================================================================

/// Fetches the page itself and extracts fields from its HTML.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataSource for PageFetcher {
    fn name(&self) -> &'static str {
        "page_fetch"
    }

    async fn fetch(&self, url: &Url) -> ExtractResult<PageMetadata> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        expect_ok(response.status(), url.as_str())?;
        let body = response.text().await?;

        debug!(
            subsystem = "extract",
            component = "page_fetch",
            url = %url,
            bytes = body.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Page fetched"
        );
        Ok(extract_page_metadata(&body, url))
    }
}

// =============================================================================
// REMOTE FUNCTION
// =============================================================================

/// Calls an alternate hosted extractor: `POST {endpoint}` with `{"url": ...}`,
/// answered with the flat extraction JSON shape.
#[derive(Clone)]
pub struct RemoteFunctionClient {
    client: Client,
    endpoint: String,
}

impl RemoteFunctionClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

/// Read the flat extraction shape back into [`PageMetadata`].
pub fn metadata_from_json(url: &Url, body: &Value) -> ExtractResult<PageMetadata> {
    let obj = body
        .as_object()
        .ok_or_else(|| ExtractError::InvalidResponse("expected a JSON object".to_string()))?;

    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    let mut meta = PageMetadata::new(url.as_str());
    meta.title = text("title");
    meta.description = text("description");
    meta.favicon = text("favicon");
    meta.domain = url.host_str().map(str::to_owned);
    for (key, value) in obj {
        if !(key.starts_with("og_") || key.starts_with("twitter_")) {
            continue;
        }
        if let Some(v) = value.as_str().map(str::trim).filter(|v| !v.is_empty()) {
            meta.properties.insert(key.clone(), v.to_string());
        }
    }

    if meta.title.is_none() {
        if let Some(err) = text("error") {
            return Err(ExtractError::InvalidResponse(err));
        }
    }
    Ok(meta)
}

#[async_trait]
impl MetadataSource for RemoteFunctionClient {
    fn name(&self) -> &'static str {
        "remote_function"
    }

    async fn fetch(&self, url: &Url) -> ExtractResult<PageMetadata> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "url": url.as_str() }))
            .send()
            .await?;
        expect_ok(response.status(), &self.endpoint)?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;
        metadata_from_json(url, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_json_reads_flat_shape() {
        let url = Url::parse("https://a.com/x").unwrap();
        let meta = metadata_from_json(
            &url,
            &json!({
                "title": " A ",
                "favicon": "https://a.com/favicon.ico",
                "og_image": "https://a.com/i.png",
                "twitter_card": "",
                "metadata": {"source": "page-fetch"}
            }),
        )
        .unwrap();
        assert_eq!(meta.title.as_deref(), Some("A"));
        assert_eq!(meta.properties.len(), 1);
        assert_eq!(meta.properties["og_image"], "https://a.com/i.png");
    }

    #[test]
    fn test_metadata_from_json_surfaces_error_field() {
        let url = Url::parse("https://a.com").unwrap();
        let err = metadata_from_json(&url, &json!({"error": "blocked"})).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidResponse(msg) if msg == "blocked"));
    }

    #[test]
    fn test_metadata_from_json_rejects_non_object() {
        let url = Url::parse("https://a.com").unwrap();
        assert!(metadata_from_json(&url, &json!([1, 2])).is_err());
    }
}
