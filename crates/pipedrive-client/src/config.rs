/*
[INPUT]:  Explicit values, environment variables, or a YAML file
[OUTPUT]: Validated client configuration (endpoint, token, timeouts, retry policy)
[POS]:    Configuration layer - session setup
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{PipedriveError, Result};

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://api.pipedrive.com/v1";

pub const ENV_API_TOKEN: &str = "PIPEDRIVE_API_TOKEN";
pub const ENV_BASE_URL: &str = "PIPEDRIVE_BASE_URL";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Token injected as `api_token` into every request
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Extra attempts allowed for a rate-limited (429) request
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
    /// Backoff when a 429 carries no usable `x-ratelimit-reset`
    #[serde(default = "default_backoff_secs")]
    pub default_backoff_secs: u64,
    /// Overall deadline for one call, retries and backoffs included
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            default_backoff_secs: default_backoff_secs(),
            deadline_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_rate_limit_retries() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    5
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            ..Self::default()
        }
    }

    /// Configuration for the public API with the given token
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self::new(DEFAULT_BASE_URL, api_token)
    }

    /// Read `PIPEDRIVE_API_TOKEN` and optionally `PIPEDRIVE_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var(ENV_API_TOKEN)
            .map_err(|_| PipedriveError::Config(format!("{ENV_API_TOKEN} is not set")))?;
        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| default_base_url());
        Ok(Self::new(base_url, api_token))
    }

    /// Load configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipedriveError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_secs = Some(deadline.as_secs());
        self
    }

    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Reject an empty token or an unusable base URL
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(PipedriveError::Config("api_token must not be empty".to_string()));
        }
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipedriveError::Config(format!(
                "unsupported base_url scheme: {}",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Base URL with trailing slashes removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn default_backoff(&self) -> Duration {
        Duration::from_secs(self.default_backoff_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}
