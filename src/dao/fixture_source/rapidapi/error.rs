//! Error types shared by the API-Football client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::upstream::UpstreamError;

/// Convenient result alias returning [`RapidApiError`] failures.
pub type RapidApiResult<T> = Result<T, RapidApiError>;

/// Failures that can occur while talking to API-Football.
#[derive(Debug, Error)]
pub enum RapidApiError {
    /// Required environment variable is missing.
    #[error("missing RapidAPI environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build RapidAPI client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or timed out.
    #[error("failed to send RapidAPI request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with an unexpected status code.
    #[error("unexpected RapidAPI response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode RapidAPI response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered 200 but reported errors in its envelope.
    #[error("RapidAPI reported an error for `{path}`: {message}")]
    Api { path: String, message: String },
    /// The payload decoded but lacks data the controller cannot do without.
    #[error("incomplete RapidAPI payload for `{path}`: {reason}")]
    Incomplete { path: String, reason: String },
}

impl From<RapidApiError> for UpstreamError {
    fn from(err: RapidApiError) -> Self {
        match err {
            RapidApiError::Incomplete { path, reason } => {
                UpstreamError::malformed(format!("{path}: {reason}"))
            }
            other => UpstreamError::unavailable("sports-data provider".into(), other),
        }
    }
}
