//! Error types for bookmarko.

use thiserror::Error;

/// Result type alias using bookmarko's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// SQLSTATE code PostgreSQL reports for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Core error type for bookmarko operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bookmark not found (or not owned by the caller)
    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(uuid::Uuid),

    /// A uniqueness constraint was violated by a non-SQL backend
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is a uniqueness violation from any backend.
    ///
    /// PostgreSQL reports these as SQLSTATE 23505; the in-memory backend
    /// reports them as [`Error::Conflict`].
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Conflict(_) => true,
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_bookmark_not_found() {
        let id = Uuid::nil();
        let err = Error::BookmarkNotFound(id);
        assert_eq!(err.to_string(), format!("Bookmark not found: {}", id));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("tag 'rust' already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: tag 'rust' already exists");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("url is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: url is required");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_conflict_is_unique_violation() {
        assert!(Error::Conflict("dup".into()).is_unique_violation());
    }

    #[test]
    fn test_other_errors_are_not_unique_violations() {
        assert!(!Error::NotFound("x".into()).is_unique_violation());
        assert!(!Error::Internal("x".into()).is_unique_violation());
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
