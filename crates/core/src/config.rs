//! Board runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the controller, the
//! reconciler and the HTTP client. The helpers below take raw `Option<String>` values rather than
//! reading the environment themselves, so callers decide where values come from and tests stay
//! independent of process-wide state.

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_REFRESH_INTERVAL_SECS};
use crate::{BoardError, BoardResult};
use std::time::Duration;
use ward_types::NonEmptyText;

/// Board configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct BoardConfig {
    api_base_url: NonEmptyText,
    refresh_interval: Duration,
    request_timeout: Option<Duration>,
}

impl BoardConfig {
    /// Create a new `BoardConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::Config` if the base URL is not an http(s) URL or the refresh interval
    /// is zero.
    pub fn new(
        api_base_url: &str,
        refresh_interval: Duration,
        request_timeout: Option<Duration>,
    ) -> BoardResult<Self> {
        let trimmed = api_base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(BoardError::Config(format!(
                "ward API URL must start with http:// or https://, got {api_base_url:?}"
            )));
        }
        let api_base_url = NonEmptyText::new(trimmed)?;

        if refresh_interval.is_zero() {
            return Err(BoardError::Config(
                "refresh interval must be greater than zero".into(),
            ));
        }
        if request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BoardError::Config(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            refresh_interval,
            request_timeout,
        })
    }

    /// Build a configuration from raw environment values.
    ///
    /// Missing values fall back to the defaults in [`crate::constants`].
    pub fn from_env_values(
        api_url: Option<String>,
        refresh_secs: Option<String>,
        request_timeout_secs: Option<String>,
    ) -> BoardResult<Self> {
        let api_url = non_blank(api_url).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let refresh = seconds_from_env_value("WARD_REFRESH_SECS", refresh_secs)?
            .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS));
        let timeout = seconds_from_env_value("WARD_REQUEST_TIMEOUT_SECS", request_timeout_secs)?;

        Self::new(&api_url, refresh, timeout)
    }

    /// Read `WARD_API_URL`, `WARD_REFRESH_SECS` and `WARD_REQUEST_TIMEOUT_SECS`.
    ///
    /// Intended for binaries at startup only.
    pub fn from_env() -> BoardResult<Self> {
        Self::from_env_values(
            std::env::var("WARD_API_URL").ok(),
            std::env::var("WARD_REFRESH_SECS").ok(),
            std::env::var("WARD_REQUEST_TIMEOUT_SECS").ok(),
        )
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_str()
    }

    /// Join a route path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Return a copy pointing at a different base URL.
    pub fn with_api_base_url(&self, api_base_url: &str) -> BoardResult<Self> {
        Self::new(api_base_url, self.refresh_interval, self.request_timeout)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a whole number of seconds from an optional string value.
///
/// `None` or blank input yields `Ok(None)`.
pub fn seconds_from_env_value(name: &str, value: Option<String>) -> BoardResult<Option<Duration>> {
    non_blank(value)
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| BoardError::Config(format!("{name} must be a whole number of seconds, got {v:?}")))
        })
        .transpose()
}
