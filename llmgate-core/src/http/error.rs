//! Forwarding error types

use thiserror::Error;

/// Errors raised while forwarding a request to an upstream provider.
///
/// These cover transport-level failures only; upstream HTTP error
/// statuses are not errors here, they are responses to pass through.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Connection to upstream failed: {0}")]
    Connect(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Upstream transport error: {0}")]
    Transport(String),

    #[error("Failed to read upstream body: {0}")]
    Body(String),

    /// The provider credential cannot be encoded as a header value
    #[error("Invalid credential for provider '{provider}'")]
    InvalidCredential { provider: String },
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForwardError::Timeout(err.to_string())
        } else if err.is_connect() {
            ForwardError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            ForwardError::Body(err.to_string())
        } else {
            ForwardError::Transport(err.to_string())
        }
    }
}
