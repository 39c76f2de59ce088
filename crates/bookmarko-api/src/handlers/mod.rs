//! HTTP handlers, grouped by resource.

pub mod bookmarks;
pub mod extension;
pub mod health;
pub mod metadata;
pub mod tags;
pub mod transfer;
pub mod users;
