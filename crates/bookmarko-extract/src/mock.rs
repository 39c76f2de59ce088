//! Mock metadata source for deterministic testing.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bookmarko_extract::{mock::MockSource, MetadataExtractor};
//!
//! let extractor = MetadataExtractor::new(Arc::new(MockSource::failing()), None);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use bookmarko_core::PageMetadata;

use crate::error::{ExtractError, ExtractResult};
use crate::source::MetadataSource;

/// A source returning a fixed answer and counting how often it was asked.
pub struct MockSource {
    response: Option<PageMetadata>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Always returns `meta`, with its `url` replaced by the requested URL.
    pub fn succeeding(meta: PageMetadata) -> Self {
        Self {
            response: Some(meta),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails as if the network were unreachable.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, url: &Url) -> ExtractResult<PageMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(meta) => Ok(PageMetadata {
                url: url.to_string(),
                ..meta.clone()
            }),
            None => Err(ExtractError::InvalidResponse("mock source failure".to_string())),
        }
    }
}
