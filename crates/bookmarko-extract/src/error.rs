//! Extraction errors.
//!
//! These never reach callers of [`crate::MetadataExtractor::extract`]; the
//! chain logs them and moves on to the next tier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

impl From<ExtractError> for bookmarko_core::Error {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidUrl(msg) => bookmarko_core::Error::InvalidInput(msg),
            ExtractError::Client(msg) => bookmarko_core::Error::Config(msg),
            other => bookmarko_core::Error::Request(other.to_string()),
        }
    }
}
