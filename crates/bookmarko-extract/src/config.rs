//! Extractor configuration.
//!
//! Loaded from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `METADATA_TIMEOUT_SECS` | 10 |
//! | `METADATA_USER_AGENT` | BookmarkoBot user agent |
//! | `METADATA_FALLBACK_URL` | unset (remote tier skipped) |

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use bookmarko_core::defaults;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Per-request timeout for both fetching tiers.
    pub timeout: Duration,
    pub user_agent: String,
    /// Alternate extraction endpoint honoring the same `{url}` contract.
    pub fallback_url: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(defaults::METADATA_TIMEOUT_SECS),
            user_agent: defaults::METADATA_USER_AGENT.to_string(),
            fallback_url: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("METADATA_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "METADATA_TIMEOUT_SECS",
                reason: format!("'{}' is not a number of seconds", raw),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "METADATA_TIMEOUT_SECS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(ua) = get("METADATA_USER_AGENT") {
            config.user_agent = ua;
        }

        if let Some(raw) = get("METADATA_FALLBACK_URL") {
            let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                name: "METADATA_FALLBACK_URL",
                reason: e.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue {
                    name: "METADATA_FALLBACK_URL",
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            config.fallback_url = Some(url.to_string());
        }

        debug!(
            subsystem = "extract",
            component = "config",
            timeout_secs = config.timeout.as_secs(),
            fallback_configured = config.fallback_url.is_some(),
            "Extractor configuration loaded"
        );
        Ok(config)
    }
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
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ExtractorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ExtractorConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.contains("BookmarkoBot"));
    }

    #[test]
    fn test_overrides() {
        let config = ExtractorConfig::from_lookup(lookup(&[
            ("METADATA_TIMEOUT_SECS", "3"),
            ("METADATA_FALLBACK_URL", "https://meta.example.com/extract"),
            ("METADATA_USER_AGENT", "test-agent"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(
            config.fallback_url.as_deref(),
            Some("https://meta.example.com/extract")
        );
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn test_blank_fallback_is_unset() {
        let config =
            ExtractorConfig::from_lookup(lookup(&[("METADATA_FALLBACK_URL", "  ")])).unwrap();
        assert!(config.fallback_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ExtractorConfig::from_lookup(lookup(&[("METADATA_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ExtractorConfig::from_lookup(lookup(&[("METADATA_TIMEOUT_SECS", "0")])).is_err());
        assert!(
            ExtractorConfig::from_lookup(lookup(&[("METADATA_FALLBACK_URL", "ftp://x.com")]))
                .is_err()
        );
    }
}
