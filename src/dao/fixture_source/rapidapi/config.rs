use std::time::Duration;

use super::error::{RapidApiError, RapidApiResult};

/// Default API-Football endpoint on RapidAPI.
pub const DEFAULT_BASE_URL: &str = "https://api-football-v1.p.rapidapi.com";
/// Default value of the `x-rapidapi-host` header.
pub const DEFAULT_HOST: &str = "api-football-v1.p.rapidapi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Runtime configuration describing how to reach API-Football.
#[derive(Debug, Clone)]
pub struct RapidApiConfig {
    pub base_url: String,
    pub host: String,
    pub api_key: String,
    /// Club whose schedule is followed.
    pub team_id: u64,
    pub timeout: Duration,
}

impl RapidApiConfig {
    /// Construct a configuration from an explicit base URL and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, team_id: u64) -> Self {
        Self {
            base_url: base_url.into(),
            host: DEFAULT_HOST.to_string(),
            api_key: api_key.into(),
            team_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env(team_id: u64) -> RapidApiResult<Self> {
        let api_key = std::env::var("RAPID_API_KEY").map_err(|_| RapidApiError::MissingEnvVar {
            var: "RAPID_API_KEY",
        })?;
        let base_url =
            std::env::var("RAPID_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url, api_key, team_id);
        if let Ok(host) = std::env::var("RAPID_API_HOST") {
            config.host = host;
        }

        Ok(config)
    }
}
