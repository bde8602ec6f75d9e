//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_API_URL` - Base URL of the shop REST API (http or https)
//!
//! ## Optional
//! - `SHOP_STORAGE_PATH` - Durable storage file (default: `.record-shop/storage.json`)
//! - `SHOP_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SHOP_PAGE_SIZE` - Catalog products per page, 1-100 (default: 12)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::catalog::DEFAULT_PAGE_SIZE;

const DEFAULT_STORAGE_PATH: &str = ".record-shop/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is joined onto
    pub api_url: Url,
    /// File holding the durable session and cart
    pub storage_path: PathBuf,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
    /// Catalog page size
    pub page_size: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            "SHOP_API_URL",
            &lookup("SHOP_API_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("SHOP_API_URL".to_string()))?,
        )?;

        let storage_path = lookup("SHOP_STORAGE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        let timeout_secs = match lookup("SHOP_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("SHOP_HTTP_TIMEOUT_SECS", &raw, 1, u64::MAX)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let page_size = match lookup("SHOP_PAGE_SIZE") {
            Some(raw) => parse_number::<u32>("SHOP_PAGE_SIZE", &raw, 1, MAX_PAGE_SIZE)?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_url,
            storage_path,
            http_timeout: Duration::from_secs(timeout_secs),
            page_size,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, forcing a trailing slash so relative joins keep
/// any path prefix (`https://host/api` + `producto/listar`).
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a bounded integer variable.
fn parse_number<T>(key: &str, raw: &str, min: T, max: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value < min || value > max {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between {min} and {max} (got {value})"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOP_API_URL", "https://api.example.test")]).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.example.test/");
        assert_eq!(config.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 12);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_api_url_keeps_path_prefix() {
        let config = load(&[("SHOP_API_URL", "http://localhost:4000/api")]).unwrap();
        assert_eq!(
            config.api_url.join("producto/listar").unwrap().as_str(),
            "http://localhost:4000/api/producto/listar"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = load(&[("SHOP_API_URL", "ftp://files.example.test")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = load(&[
            ("SHOP_API_URL", "https://api.example.test"),
            ("SHOP_HTTP_TIMEOUT_SECS", "0"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_rejects_oversized_page() {
        let result = load(&[
            ("SHOP_API_URL", "https://api.example.test"),
            ("SHOP_PAGE_SIZE", "500"),
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOP_API_URL", "https://api.example.test/"),
            ("SHOP_STORAGE_PATH", "/tmp/shop.json"),
            ("SHOP_HTTP_TIMEOUT_SECS", "5"),
            ("SHOP_PAGE_SIZE", "24"),
            ("SENTRY_DSN", "https://key@sentry.example.test/1"),
        ])
        .unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/tmp/shop.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 24);
        assert!(config.sentry_dsn.is_some());
    }
}
