//! Pipeline API configuration.
//!
//! Configuration is resolved once at process start and injected into the
//! client, so nothing in the library reads ambient environment state at call
//! time.

use serde::{Deserialize, Serialize};

/// Default API host when none is configured.
pub const DEFAULT_API_HOST: &str = "localhost";

/// Default API port when none is configured.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Default base path of the pipeline API.
pub const DEFAULT_API_PATH: &str = "/api/pipeline";

/// Default `api-version` header value.
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Pipeline API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Hostname of the pipeline API server.
    pub host: String,

    /// Port of the pipeline API server.
    pub port: u16,

    /// Base path of the pipeline API (e.g. `/api/pipeline`).
    pub base_path: String,

    /// Value sent in the `api-version` request header.
    pub api_version: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_API_PORT,
            base_path: DEFAULT_API_PATH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Build a configuration from `API_HOST`, `API_PORT`, `API_PATH` and
    /// `API_VERSION` environment variables, falling back to the defaults for
    /// any that are unset or unparseable.
    ///
    /// Intended to be called once during startup; the resulting value is
    /// passed into [`crate::services::PipelineClient::new`].
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            base_path: std::env::var("API_PATH").unwrap_or(defaults.base_path),
            api_version: std::env::var("API_VERSION").unwrap_or(defaults.api_version),
            timeout_secs: defaults.timeout_secs,
        }
    }

    /// Base URL for API requests, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.host,
            self.port,
            self.base_path.trim_end_matches('/')
        )
    }
}
