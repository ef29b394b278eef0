//! Client configuration

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Client configuration for reaching the Gather server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:5000")
    pub base_url: String,

    /// Transport timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration with no timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set the transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `GATHER_API_URL` is required; `GATHER_API_TIMEOUT` is optional and
    /// given in seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("GATHER_API_URL").map_err(|_| ConfigError::MissingBaseUrl)?;

        let timeout = match env::var("GATHER_API_TIMEOUT") {
            Ok(raw) => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout)?,
            )),
            Err(_) => None,
        };

        Ok(Self { base_url, timeout })
    }

    /// Join a path onto the base URL
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
