//! Structured logging field names for bookmarko.
//!
//! All crates use these names for consistent structured logging fields so
//! log aggregation can query by the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "tags", "extract", "auth"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "reconciler", "pool", "page_fetch", "fallback_chain"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "add_tags", "update_tags", "extract", "import"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning user UUID.
pub const USER_ID: &str = "user_id";

/// Bookmark UUID being operated on.
pub const BOOKMARK_ID: &str = "bookmark_id";

/// URL being extracted or saved.
pub const URL: &str = "url";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of tag names involved in an operation.
pub const TAG_COUNT: &str = "tag_count";

/// Number of rows returned or affected.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Extraction tier that produced a metadata result.
pub const SOURCE: &str = "source";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
