//! Error types shared by the Reddit client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::upstream::UpstreamError;

/// Convenient result alias returning [`RedditError`] failures.
pub type RedditResult<T> = Result<T, RedditError>;

/// Failures that can occur while talking to Reddit.
#[derive(Debug, Error)]
pub enum RedditError {
    /// Required environment variable is missing.
    #[error("missing Reddit environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed.
    #[error("failed to build Reddit client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// Token exchange was refused.
    #[error("Reddit authentication failed: {reason}")]
    Auth { reason: String },
    /// A request could not be sent or timed out.
    #[error("failed to send Reddit request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Reddit answered with an unexpected status code.
    #[error("unexpected Reddit response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be decoded.
    #[error("failed to decode Reddit response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// Reddit accepted the request but reported errors in the `json.errors` block.
    #[error("Reddit rejected `{path}`: {message}")]
    Api { path: String, message: String },
}

impl From<RedditError> for UpstreamError {
    fn from(err: RedditError) -> Self {
        UpstreamError::unavailable("community platform".into(), err)
    }
}
