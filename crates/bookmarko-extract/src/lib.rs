//! # bookmarko-extract
//!
//! Turns a bare URL into title, description, favicon and Open Graph /
//! Twitter card fields through an ordered fallback chain that never fails
//! the caller.

pub mod chain;
pub mod config;
pub mod error;
pub mod html;
pub mod local;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod source;

pub use chain::MetadataExtractor;
pub use config::{ConfigError, ExtractorConfig};
pub use error::{ExtractError, ExtractResult};
pub use html::{extract_page_metadata, resolve_favicon};
pub use source::{MetadataSource, PageFetcher, RemoteFunctionClient};
