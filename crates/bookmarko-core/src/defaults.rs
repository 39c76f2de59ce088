//! Centralized default constants for bookmarko.
//!
//! Crates reference these instead of defining their own magic numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 3000;

/// Default database URL when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/bookmarko";

/// Origins allowed to call the authenticated API when `ALLOWED_ORIGINS` is unset.
pub const ALLOWED_ORIGINS: &[&str] = &["https://bookmarko.engn.dev", "http://localhost:3000"];

/// Maximum accepted request body (import files are the largest payloads).
pub const REQUEST_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// AUTH
// =============================================================================

/// Session lifetime in hours (30 days).
pub const SESSION_TTL_HOURS: i64 = 720;

/// Length of generated bearer tokens.
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 64;

// =============================================================================
// TAGS
// =============================================================================

/// Default limit for the recently-created tag list.
pub const RECENT_TAGS_LIMIT: i64 = 5;

// =============================================================================
// METADATA EXTRACTION
// =============================================================================

/// Timeout for fetching a page or calling the fallback endpoint.
pub const METADATA_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent when fetching pages.
pub const METADATA_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; BookmarkoBot/1.0; +https://bookmarko.app)";
