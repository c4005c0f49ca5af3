use std::time::Duration;

use evopub_core::CacheConfig;

/// Stream name used when neither the caller nor the environment names one.
pub const DEFAULT_STREAM: &str = "evolution:events";

/// Environment variable overriding the default stream name.
pub const STREAM_ENV_VAR: &str = "EVOPUB_EVENTS_STREAM";

const DEFAULT_APPEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Stream appended to when a request does not name one.
    pub default_stream: String,
    /// Upper bound on one transport append. Expiry is reported as an
    /// append failure.
    pub append_timeout: Duration,
    pub cache: CacheConfig,
}

impl PublisherConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let default_stream = std::env::var(STREAM_ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STREAM.to_string());

        Self {
            default_stream,
            ..Self::default()
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            default_stream: DEFAULT_STREAM.to_string(),
            append_timeout: DEFAULT_APPEND_TIMEOUT,
            cache: CacheConfig::default(),
        }
    }
}
