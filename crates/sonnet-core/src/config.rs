//! Configuration for the remote mirror and the auto-sync scheduler.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Default timeout for remote mirror requests.
///
/// A hung remote call would otherwise hold the sync in-flight guard
/// indefinitely.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the remote rows API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base endpoint, e.g. `https://project.supabase.co`
    pub endpoint: String,
    /// Public API key sent as `apikey` and bearer token
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Create a validated remote configuration.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = normalize_text_option(Some(endpoint.into()))
            .ok_or_else(|| Error::InvalidInput("endpoint must not be empty".to_string()))?;
        if !is_http_url(&endpoint) {
            return Err(Error::InvalidInput(
                "endpoint must include http:// or https://".to_string(),
            ));
        }
        let api_key = normalize_text_option(Some(api_key.into()))
            .ok_or_else(|| Error::InvalidInput("api key must not be empty".to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Timing knobs for the auto-sync scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSyncConfig {
    /// Period between scheduled sync checks
    pub interval: Duration,
    /// Minimum gap since the last successful attempt before running again
    pub debounce: Duration,
    /// Delay between the forced on-mount sync and the periodic loop
    pub startup_delay: Duration,
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            debounce: Duration::from_secs(10),
            startup_delay: Duration::from_millis(500),
        }
    }
}

impl AutoSyncConfig {
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub const fn with_startup_delay(mut self, startup_delay: Duration) -> Self {
        self.startup_delay = startup_delay;
        self
    }
}
