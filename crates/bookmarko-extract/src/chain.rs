//! The metadata fallback chain.
//!
//! Tiers run in order and each is attempted only when the previous one
//! failed or produced no title:
//!
//! 1. page fetch (`page-fetch`)
//! 2. remote extraction endpoint, when configured (`remote-function`)
//! 3. URL-derived metadata (`local-fallback` / `minimal-fallback`)
//!
//! The last tier cannot fail, so [`MetadataExtractor::extract`] returns an
//! [`ExtractionResult`] rather than a `Result`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use url::Url;

use bookmarko_core::{ExtractionResult, FallbackTier};

use crate::config::ExtractorConfig;
use crate::error::ExtractResult;
use crate::local;
use crate::source::{build_client, MetadataSource, PageFetcher, RemoteFunctionClient};

/// Best-effort metadata extraction for bookmark URLs.
#[derive(Clone)]
pub struct MetadataExtractor {
    primary: Arc<dyn MetadataSource>,
    secondary: Option<Arc<dyn MetadataSource>>,
}

impl MetadataExtractor {
    pub fn new(primary: Arc<dyn MetadataSource>, secondary: Option<Arc<dyn MetadataSource>>) -> Self {
        Self { primary, secondary }
    }

    /// Build the standard chain: page fetch, then the remote endpoint when
    /// `fallback_url` is set. Both tiers share one HTTP client.
    pub fn from_config(config: &ExtractorConfig) -> ExtractResult<Self> {
        let client = build_client(config)?;
        let secondary = config.fallback_url.as_ref().map(|endpoint| {
            Arc::new(RemoteFunctionClient::new(client.clone(), endpoint.clone()))
                as Arc<dyn MetadataSource>
        });
        Ok(Self::new(Arc::new(PageFetcher::new(client)), secondary))
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Produce metadata for `raw_url`. Never fails.
    pub async fn extract(&self, raw_url: &str) -> ExtractionResult {
        let start = Instant::now();
        let raw = raw_url.trim();

        let result = match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
                self.run_chain(&url).await
            }
            Ok(url) if url.host_str().is_some() => local::derive(&url),
            _ => local::minimal(raw),
        };

        info!(
            subsystem = "extract",
            component = "fallback_chain",
            op = "extract",
            url = raw,
            source = result.source(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Metadata extracted"
        );
        result
    }

    async fn run_chain(&self, url: &Url) -> ExtractionResult {
        if let Some(meta) = self.try_source(self.primary.as_ref(), url).await {
            return ExtractionResult::Primary(meta);
        }
        if let Some(secondary) = &self.secondary {
            if let Some(meta) = self.try_source(secondary.as_ref(), url).await {
                return ExtractionResult::Fallback(meta, FallbackTier::RemoteFunction);
            }
        }
        local::derive(url)
    }

    async fn try_source(
        &self,
        source: &dyn MetadataSource,
        url: &Url,
    ) -> Option<bookmarko_core::PageMetadata> {
        match source.fetch(url).await {
            Ok(meta) if meta.is_usable() => Some(meta),
            Ok(_) => {
                warn!(
                    subsystem = "extract",
                    component = source.name(),
                    url = %url,
                    "No title found, falling through"
                );
                None
            }
            Err(e) => {
                warn!(
                    subsystem = "extract",
                    component = source.name(),
                    url = %url,
                    error = %e,
                    "Metadata tier failed, falling through"
                );
                None
            }
        }
    }
}
