//! # bookmarko-core
//!
//! Core types, traits, and abstractions for bookmarko.
//!
//! This crate provides the domain models, repository traits, error type and
//! shared helpers that the other bookmarko crates depend on.

pub mod defaults;
pub mod error;
pub mod extension;
pub mod filter;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod recovery;
pub mod tags;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use extension::{ExtensionMessage, ExtensionResponse};
pub use filter::{BookmarkQuery, SortField, SortOrder};
pub use metadata::{ExtractionResult, FallbackTier, PageMetadata};
pub use models::*;
pub use recovery::{write_or_recover, WriteOutcome};
pub use tags::*;
pub use traits::*;
pub use uuid_utils::new_v7;
