use std::error::Error;
use thiserror::Error;

/// Result alias for collaborator calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Error raised by collaborator clients regardless of the concrete backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The collaborator could not be reached or answered with a failure.
    #[error("upstream unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The collaborator answered but the payload lacks required data.
    #[error("upstream payload malformed: {message}")]
    Malformed { message: String },
}

impl UpstreamError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        UpstreamError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a malformed-payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        UpstreamError::Malformed {
            message: message.into(),
        }
    }
}
