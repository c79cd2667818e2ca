use std::time::Duration;

use super::error::{RedditError, RedditResult};

/// Token endpoint of the password grant.
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";
/// Authenticated API host.
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Credentials and community settings for the Reddit client.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub auth_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    /// Community name without the `r/` prefix.
    pub subreddit: String,
    /// Flair applied to every created thread.
    pub flair_template_id: Option<String>,
    pub timeout: Duration,
}

impl RedditConfig {
    /// Build a configuration by reading the credential environment variables.
    pub fn from_env(subreddit: impl Into<String>) -> RedditResult<Self> {
        Ok(Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            client_id: required("REDDIT_CLIENT_ID")?,
            client_secret: required("REDDIT_CLIENT_SECRET")?,
            username: required("REDDIT_USERNAME")?,
            password: required("REDDIT_PASSWORD")?,
            user_agent: required("REDDIT_USER_AGENT")?,
            subreddit: subreddit.into(),
            flair_template_id: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Point the client at other hosts (test servers, proxies).
    pub fn with_endpoints(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    /// Set the flair applied to created threads.
    pub fn with_flair(mut self, flair_template_id: Option<String>) -> Self {
        self.flair_template_id = flair_template_id;
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn required(var: &'static str) -> RedditResult<String> {
    std::env::var(var).map_err(|_| RedditError::MissingEnvVar { var })
}
