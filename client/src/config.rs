//! Client configuration.
//!
//! Defaults target the public DummyJSON API. Every value can be overridden
//! with a builder method or a `STOREFRONT_*` environment variable.

use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com";

/// Default number of posts per feed page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default quiet period before a search term is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint is joined to (no trailing slash).
    ///
    /// Default: `https://dummyjson.com`
    pub api_base_url: String,

    /// Posts per feed page.
    ///
    /// Default: 20
    pub page_size: u32,

    /// Timeout applied by the HTTP transport.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Quiet period before a typed search term is applied.
    ///
    /// Default: 500 ms
    pub search_debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: storefront_remote::DEFAULT_TIMEOUT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl ClientConfig {
    /// Create configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the feed page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the transport timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the search debounce delay.
    #[must_use]
    pub const fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Reads `STOREFRONT_API_URL`, `STOREFRONT_PAGE_SIZE`,
    /// `STOREFRONT_TIMEOUT_SECS` and `STOREFRONT_DEBOUNCE_MS`; unset
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable does not parse or the result
    /// fails [`ClientConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("STOREFRONT_API_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(size) = parse_var::<u32>(&lookup, "STOREFRONT_PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "STOREFRONT_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = parse_var::<u64>(&lookup, "STOREFRONT_DEBOUNCE_MS")? {
            config.search_debounce = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBaseUrl`] for an empty or non-http(s) URL
    /// - [`ConfigError::ZeroPageSize`] for a page size of 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        let has_scheme = url.starts_with("https://") || url.starts_with("http://");
        let has_host = url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
        if !has_scheme || !has_host {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    /// Join `path` to the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidVariable {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
