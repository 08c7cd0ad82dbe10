use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the core. Nothing here is retried or suppressed,
/// callers decide what the user sees.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, timeout or non-success status from an external service
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Payload does not have the expected structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// An expected result identifier is missing from a response
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            Error::ServiceUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedResponse(err.to_string())
    }
}
