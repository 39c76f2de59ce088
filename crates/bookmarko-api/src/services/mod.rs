//! Services shared by the HTTP handlers.

pub mod auth;
pub mod bookmarks;
pub mod transfer;

pub use auth::{AuthService, AuthSession};
