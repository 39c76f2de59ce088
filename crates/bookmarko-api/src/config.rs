//! Server configuration read from the environment.

use std::str::FromStr;

use axum::http::HeaderValue;
use tracing::warn;

use bookmarko_core::{defaults, Error, Result};

/// Where bookmarks, tags and users are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local storage; everything is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!(
                "STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage: StorageBackend,
    /// Origins allowed to call the authenticated API from a browser.
    pub allowed_origins: Vec<HeaderValue>,
    pub session_ttl: chrono::Duration,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            storage: StorageBackend::default(),
            allowed_origins: parse_allowed_origins(None),
            session_ttl: chrono::Duration::hours(defaults::SESSION_TTL_HOURS),
            body_limit: defaults::REQUEST_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Unset or blank
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(raw) = get("PORT") {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT '{}' is not a valid port", raw)))?;
        }
        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(raw) = get("STORAGE_BACKEND") {
            config.storage = raw.parse()?;
        }
        config.allowed_origins = parse_allowed_origins(get("ALLOWED_ORIGINS").as_deref());
        if let Some(raw) = get("SESSION_TTL_HOURS") {
            let hours: i64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("SESSION_TTL_HOURS '{}' is not a number", raw))
            })?;
            if hours <= 0 {
                return Err(Error::Config(
                    "SESSION_TTL_HOURS must be greater than zero".to_string(),
                ));
            }
            config.session_ttl = chrono::Duration::hours(hours);
        }

        Ok(config)
    }
}

/// Parse a comma-separated origin list into header values, skipping (and
/// logging) entries that are not valid header values. `None` yields the
/// default list.
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let origins: Vec<String> = match raw {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => defaults::ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    origins
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.session_ttl, chrono::Duration::hours(720));
        assert_eq!(config.allowed_origins.len(), defaults::ALLOWED_ORIGINS.len());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "Memory"),
            ("SESSION_TTL_HOURS", "1"),
            ("ALLOWED_ORIGINS", "https://a.com/, https://b.com"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.session_ttl, chrono::Duration::hours(1));
        assert_eq!(
            config.allowed_origins,
            vec![
                HeaderValue::from_static("https://a.com"),
                HeaderValue::from_static("https://b.com")
            ]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "sqlite")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("SESSION_TTL_HOURS", "0")])).is_err());
    }

    #[test]
    fn test_invalid_origin_is_skipped() {
        let origins = parse_allowed_origins(Some("https://ok.com,bad\norigin"));
        assert_eq!(origins, vec![HeaderValue::from_static("https://ok.com")]);
    }
}
